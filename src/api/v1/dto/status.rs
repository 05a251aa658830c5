use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
}
