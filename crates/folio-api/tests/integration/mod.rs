mod http;
mod service;
