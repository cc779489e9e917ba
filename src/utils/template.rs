//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const TAG: &'static str = "tag";
    pub const NAME: &'static str = "name";
    pub const EMAIL: &'static str = "email";
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

pub fn is_present(template: &str, key: &str) -> bool {
    let placeholder = format!("{{{{{}}}}}", key);
    template.contains(&placeholder)
}
