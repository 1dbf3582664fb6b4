use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubnetRequest {
    pub subnet: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ContainsResponse {
    pub contained: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub subnets: Vec<String>,
}
