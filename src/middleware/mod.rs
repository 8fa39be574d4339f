pub mod item_request;
