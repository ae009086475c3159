pub mod chat_answer_response;
pub mod chat_answer_route;
pub mod chat_frames;
pub mod chat_request;
pub mod chat_stream_route;
