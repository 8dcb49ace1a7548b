// Library root
// -----------
// The binary (`main.rs`) parses a `ProbeConfig` and hands it to
// `probe::submit_job`.
//
// Module responsibilities:
// - `config`: probe settings and their command-line / environment sources.
// - `api`: the blocking multipart upload against the submit endpoint.
// - `probe`: runs one upload and prints the outcome.
pub mod api;
pub mod config;
pub mod probe;
