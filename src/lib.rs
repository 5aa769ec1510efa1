//! Console for a container provisioning service: end users manage the one
//! container bound to their client id, administrators watch and control
//! all containers and the user list. Everything durable lives behind the
//! service's REST API.

pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod notifications;
pub mod outbound;
pub mod poller;
pub mod render;
pub mod views;
