// Request handlers
//
// resource: the five CRUD operations, shared by every table
// root:     service info, health, documentation and the 404 fallback
pub mod resource;
pub mod root;
