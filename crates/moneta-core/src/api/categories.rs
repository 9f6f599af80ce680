use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{Category, ListResponse, NewCategory};

const CATEGORIES_PATH: &str = "/categorias/";

impl ApiClient {
    /// The user's own categories plus the system defaults
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let list: ListResponse<Category> = self.get_json(CATEGORIES_PATH).await?;
        Ok(list.into_vec())
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        category.validate().map_err(ApiError::Validation)?;
        self.send_json(Method::POST, CATEGORIES_PATH, category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::client_for;
    use crate::models::CategoryKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_and_create_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categorias/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "nome": "Salário", "tipo": "receita", "icone": "attach_money", "cor": "#12A454", "padrao": true },
                { "id": 8, "nome": "Pets", "tipo": "despesa", "icone": "more_horiz", "cor": "#6B7280", "padrao": false }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/categorias/"))
            .and(body_json(json!({ "nome": "Pets", "tipo": "despesa" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(
                { "id": 8, "nome": "Pets", "tipo": "despesa", "icone": "more_horiz", "cor": "#6B7280", "padrao": false }
            )))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let categories = client.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert!(categories[0].is_default);

        let created = client
            .create_category(&NewCategory::new("Pets", CategoryKind::Expense))
            .await
            .unwrap();
        assert_eq!(created.id, 8);
    }

    #[tokio::test]
    async fn test_create_category_requires_name() {
        let server = MockServer::start().await;
        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let result = client.create_category(&NewCategory::new("", CategoryKind::Income)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
