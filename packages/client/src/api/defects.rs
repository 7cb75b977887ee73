use reqwest::Method;
use serde_json::{Map, Value};

use defects_core::{
    ActionMethod, ActionRequest, CommentField, CommentRecord, CommentSet, Defect, DefectCreate,
    DefectUpdate, Id,
};

use crate::client::ApiClient;
use crate::error::ClientResult;

/// What the service returned for an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    Updated(Box<Defect>),
    Deleted,
}

impl ApiClient {
    pub async fn list_defects(&self) -> ClientResult<Vec<Defect>> {
        self.get_json("/defects").await
    }

    pub async fn get_defect(&self, id: Id) -> ClientResult<Defect> {
        self.get_json(&format!("/defects/{}", id)).await
    }

    pub async fn create_defect(&self, input: &DefectCreate) -> ClientResult<Defect> {
        let body = serde_json::to_value(input)?;
        self.send_json(Method::POST, "/defects", &body).await
    }

    pub async fn update_defect(&self, id: Id, update: &DefectUpdate) -> ClientResult<Defect> {
        self.send_json(Method::PUT, &format!("/defects/{}", id), &update.as_json())
            .await
    }

    pub async fn delete_defect(&self, id: Id) -> ClientResult<()> {
        self.send_unit(Method::DELETE, &format!("/defects/{}", id), None)
            .await
    }

    /// Send a prepared lifecycle action
    pub async fn run_action(&self, request: &ActionRequest) -> ClientResult<ActionResponse> {
        match request.action.method() {
            ActionMethod::Delete => {
                self.delete_defect(request.defect_id).await?;
                Ok(ActionResponse::Deleted)
            }
            ActionMethod::Patch => {
                let body = if is_empty_object(&request.body) {
                    None
                } else {
                    Some(&request.body)
                };
                let response = self.send(Method::PATCH, &request.path(), body).await?;
                let defect: Defect = crate::client::decode(response).await?;
                Ok(ActionResponse::Updated(Box::new(defect)))
            }
        }
    }

    /// All comment rows merged into one value per field
    pub async fn get_comments(&self, id: Id) -> ClientResult<CommentSet> {
        let records: Vec<CommentRecord> = self.get_json(&format!("/defects/{}/comments", id)).await?;
        Ok(CommentSet::merge(&records))
    }

    pub async fn update_comment(
        &self,
        id: Id,
        field: CommentField,
        text: &str,
    ) -> ClientResult<CommentRecord> {
        let mut body = Map::new();
        body.insert(field.as_str().to_string(), Value::String(text.to_string()));
        let body = Value::Object(body);
        self.send_json(Method::PATCH, &format!("/defects/{}/comments", id), &body)
            .await
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().map(|o| o.is_empty()).unwrap_or(value.is_null())
}
