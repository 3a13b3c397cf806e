use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "subdomain": "acme",
        "rfid": "E1",
        "name": "Jane Doe",
        "department_name": "Assembly",
        "batch": "Morning",
        "photo": null
    })
)]
pub struct Worker {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = "acme")]
    pub subdomain: String,

    #[schema(example = "E1")]
    pub rfid: String,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "Assembly", nullable = true)]
    pub department_name: Option<String>,

    #[schema(example = "Morning", nullable = true)]
    pub batch: Option<String>,

    #[schema(nullable = true)]
    pub photo: Option<String>,
}
