//! HTTP adapter for the remote task service.
//!
//! `ApiClient` issues one request per call, checks the response status and
//! decodes the JSON body into the local types of [`crate::task`]. Nothing is
//! retried and nothing is cached; the caller owns the raw collection.

use std::time::Duration;

use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::fields::Status;
use crate::task::*;

/// Async client bound to one service base URL (e.g. `http://localhost:8000/api/`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client without a request timeout.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client, optionally bounding every request by `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { http: builder.build()?, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET tasks/`
    pub async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let resp = self.send(Method::GET, "tasks/", None::<&()>).await?;
        decode(resp).await
    }

    /// `GET tasks/{id}/`
    pub async fn get_task(&self, id: u64) -> ApiResult<Task> {
        let resp = self.send(Method::GET, &format!("tasks/{id}/"), None::<&()>).await?;
        decode(resp).await
    }

    /// `POST tasks/`
    pub async fn create_task(&self, payload: &TaskPayload) -> ApiResult<Task> {
        let resp = self.send(Method::POST, "tasks/", Some(payload)).await?;
        decode(resp).await
    }

    /// Full-edit `PATCH tasks/{id}/`
    pub async fn update_task(&self, id: u64, payload: &TaskPayload) -> ApiResult<Task> {
        let resp = self.send(Method::PATCH, &format!("tasks/{id}/"), Some(payload)).await?;
        decode(resp).await
    }

    /// Status-only `PATCH tasks/{id}/`
    pub async fn set_status(&self, id: u64, status: Status) -> ApiResult<Task> {
        let patch = StatusPatch { status };
        let resp = self.send(Method::PATCH, &format!("tasks/{id}/"), Some(&patch)).await?;
        decode(resp).await
    }

    /// `DELETE tasks/{id}/`; only the status matters.
    pub async fn delete_task(&self, id: u64) -> ApiResult<()> {
        self.send(Method::DELETE, &format!("tasks/{id}/"), None::<&()>).await?;
        Ok(())
    }

    /// `POST contexts/`
    pub async fn create_context(&self, context: &NewContext) -> ApiResult<ContextEntry> {
        let resp = self.send(Method::POST, "contexts/", Some(context)).await?;
        decode(resp).await
    }

    /// `POST suggestions/`
    pub async fn suggest(&self, input: &str) -> ApiResult<Suggestion> {
        let body = json!({ "input": input });
        let resp = self.send(Method::POST, "suggestions/", Some(&body)).await?;
        decode(resp).await
    }

    /// Issue a request and fail on any non-success status.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Response> {
        let url = self.base.join(path)?;
        tracing::debug!("sending {} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }
}

/// Read the body as text first so shape errors surface as `Payload`, not `Transport`.
async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let text = resp.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{ContextSource, Tier};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_list_tasks_maps_raw_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "a", "description": "x", "status": "done",
                 "priority_score": 0.9, "deadline": "2025-01-01", "category": "Work"},
                {"id": 2, "title": "b", "description": null, "status": "not completed",
                 "priority_score": 0.2, "deadline": "", "category": {"id": 3, "name": "Home", "usage_count": 1}},
                {"id": 3, "title": "c", "priority_score": null}
            ])))
            .mount(&server)
            .await;

        let tasks = client(&server).await.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].priority(), Tier::High);
        assert!(tasks[0].status.is_done());
        assert_eq!(tasks[1].deadline, None);
        assert!(!tasks[1].status.is_done());
        assert_eq!(tasks[1].category_name().as_deref(), Some("Home"));
        assert_eq!(tasks[2].priority_score, 0.0);
        assert_eq!(tasks[2].priority(), Tier::Low);
    }

    #[tokio::test]
    async fn test_toggle_sends_status_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/tasks/5/"))
            .and(body_json(json!({"status": "done"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 5, "status": "done"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let task = client(&server).await.set_status(5, Status::Done).await.unwrap();
        assert_eq!(task.status, Status::Done);
    }

    #[tokio::test]
    async fn test_create_task_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tasks/"))
            .and(body_json(json!({
                "title": "Write report",
                "description": "",
                "category": "Work",
                "priority_score": 1.0,
                "deadline": null,
                "status": "pending"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 11, "title": "Write report", "priority_score": 1.0, "status": "pending"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = TaskPayload {
            title: "Write report".into(),
            description: String::new(),
            category: "Work".into(),
            priority_score: 1.0,
            deadline: None,
            status: Some(Status::Open),
        };
        let created = client(&server).await.create_task(&payload).await.unwrap();
        assert_eq!(created.id, 11);
    }

    #[tokio::test]
    async fn test_update_task_patches_full_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/tasks/4/"))
            .and(body_json(json!({
                "title": "Gym",
                "description": "legs",
                "category": "Health",
                "priority_score": 0.1,
                "deadline": "2025-06-01"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 4, "title": "Gym", "priority_score": 0.1, "status": "pending"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = TaskPayload {
            title: "Gym".into(),
            description: "legs".into(),
            category: "Health".into(),
            priority_score: 0.1,
            deadline: Some("2025-06-01".into()),
            status: None,
        };
        let updated = client(&server).await.update_task(4, &payload).await.unwrap();
        assert_eq!(updated.id, 4);
        assert_eq!(updated.priority(), Tier::Low);
    }

    #[tokio::test]
    async fn test_delete_failure_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/9/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found."))
            .mount(&server)
            .await;

        let err = client(&server).await.delete_task(9).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_payload_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).await.list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Payload(_)));
    }

    #[tokio::test]
    async fn test_suggest_and_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/suggestions/"))
            .and(body_json(json!({"input": "meeting tomorrow"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Prepare meeting", "priority": "High"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/contexts/"))
            .and(body_json(json!({"source": "whatsapp", "content": "call mum"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 4, "source": "whatsapp", "content": "call mum"
            })))
            .mount(&server)
            .await;

        let api = client(&server).await;
        let suggestion = api.suggest("meeting tomorrow").await.unwrap();
        assert_eq!(suggestion.title.as_deref(), Some("Prepare meeting"));
        assert_eq!(suggestion.priority.as_deref(), Some("High"));

        let entry = api
            .create_context(&NewContext { source: ContextSource::Whatsapp, content: "call mum".into() })
            .await
            .unwrap();
        assert_eq!(entry.id, Some(4));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:9/api/").unwrap();
        let err = api.list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = ApiClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/api/");
        assert!(ApiClient::new("not a url").is_err());
    }
}
