/// Iframe pages loaded by the host
pub mod components;
pub mod link_form;
pub mod section;
pub mod settings;
