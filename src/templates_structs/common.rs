use askama::Template;

use crate::intake::transcript::DEMO_QUESTIONS;

pub const APP_NAME: &str = "LucidAI Career";

#[derive(Template)]
#[template(path = "index.html")]
pub struct LandingTemplate {
    pub app_name: &'static str,
    pub demo_questions: Vec<&'static str>,
}

impl LandingTemplate {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME,
            demo_questions: DEMO_QUESTIONS.to_vec(),
        }
    }
}

impl Default for LandingTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub app_name: &'static str,
}
