use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{ListResponse, MonthlySummary, NewTransaction, Transaction, TransactionFilter, TransactionSummary};

const TRANSACTIONS_PATH: &str = "/transacoes/";
const MONTHLY_SUMMARY_PATH: &str = "/transacoes/resumo_mensal/";

impl ApiClient {
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionSummary>, ApiError> {
        let path = format!("{}{}", TRANSACTIONS_PATH, filter.to_query());
        let list: ListResponse<TransactionSummary> = self.get_json(&path).await?;
        Ok(list.into_vec())
    }

    pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        transaction.validate().map_err(ApiError::Validation)?;
        self.send_json(Method::POST, TRANSACTIONS_PATH, transaction).await
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("{}{}/", TRANSACTIONS_PATH, id)).await
    }

    /// Income, expenses and spending per category for `month` (1-12) of `year`
    pub async fn monthly_summary(&self, month: u32, year: i32) -> Result<MonthlySummary, ApiError> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::Validation(format!("Invalid month: {}", month)));
        }
        let path = format!("{}?mes={}&ano={}", MONTHLY_SUMMARY_PATH, month, year);
        self.get_json(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::client_for;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_transactions_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/"))
            .and(query_param("tipo", "despesa"))
            .and(query_param("conta", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "tipo": "despesa", "descricao": "Mercado", "valor": "87.90", "data": "2024-03-15",
                  "conta_origem_nome": "Nubank", "categoria_nome": "Compras", "categoria_icone": "shopping_cart" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            account: Some(3),
            ..TransactionFilter::default()
        };
        let rows = client.list_transactions(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 87.9);
    }

    #[tokio::test]
    async fn test_create_transaction_rejects_invalid_transfer_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let tx = NewTransaction::new(TransactionKind::Transfer, 1, "Reserva", 100.0, date);
        assert!(matches!(client.create_transaction(&tx).await, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_and_delete_transaction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/"))
            .and(body_json(json!({
                "tipo": "receita", "conta_origem": 1, "categoria": 4,
                "descricao": "Salário", "valor": 3000.0, "data": "2024-03-05"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 77, "tipo": "receita", "conta_origem": 1, "conta_origem_detalhes": null,
                "conta_destino": null, "conta_destino_detalhes": null, "categoria": 4,
                "categoria_detalhes": null, "descricao": "Salário", "valor": "3000.00",
                "data": "2024-03-05", "observacoes": "", "created_at": "2024-03-05T08:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/transacoes/77/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mut tx = NewTransaction::new(TransactionKind::Income, 1, "Salário", 3000.0, date);
        tx.category = Some(4);
        let created = client.create_transaction(&tx).await.unwrap();
        assert_eq!(created.id, 77);
        assert_eq!(created.amount, 3000.0);

        client.delete_transaction(77).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_transaction_backend_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transacoes/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "conta_origem": ["Invalid pk \"9\" - object does not exist."]
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let tx = NewTransaction::new(TransactionKind::Expense, 9, "Café", 5.0, date);
        match client.create_transaction(&tx).await.unwrap_err() {
            ApiError::Validation(msg) => assert!(msg.starts_with("conta_origem:")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_monthly_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transacoes/resumo_mensal/"))
            .and(query_param("mes", "3"))
            .and(query_param("ano", "2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mes": 3, "ano": 2024, "receitas": 5000.0, "despesas": 1200.0, "saldo": 3800.0,
                "gastos_por_categoria": [
                    { "categoria__nome": "Moradia", "categoria__icone": "home", "categoria__cor": "#3B82F6", "total": 1200.0 }
                ]
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let summary = client.monthly_summary(3, 2024).await.unwrap();
        assert_eq!(summary.balance, 3800.0);
        assert_eq!(summary.spending_by_category[0].name, "Moradia");

        assert!(matches!(client.monthly_summary(13, 2024).await, Err(ApiError::Validation(_))));
    }
}
