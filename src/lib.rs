// Module layout (Clean Architecture style)
// - bootstrap: configuration, service wiring and essential seed data
// - infrastructure: Postgres repositories, bcrypt/JWT, payload crypto, mail
// - presentation: HTTP handlers, routing and the encryption middleware
// - application: ports, use cases and access control
// - domain: core models and pure rules

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
