//! End-to-end tests run against a deployed backend.
//! The backend url is taken from `LIBRARY_MANAGER_API_URL`, `http://127.0.0.1:3001` by default


#[cfg(all(test, any(feature = "system_tests", feature = "load_tests")))]
pub(crate) fn backend_url() -> String {
    std::env::var("LIBRARY_MANAGER_API_URL").unwrap_or("http://127.0.0.1:3001".to_string())
}
