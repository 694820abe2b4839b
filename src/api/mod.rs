pub mod http_items_service;
pub mod items_service;
#[cfg(test)]
pub mod mock_items_service;
pub mod types;
