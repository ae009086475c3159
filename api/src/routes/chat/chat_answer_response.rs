use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatAnswerResponse {
    pub answer: String,
    pub sources: Vec<String>,
}
