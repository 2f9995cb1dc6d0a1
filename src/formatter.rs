//! Markdown rendering of documentation modules.

use crate::model::{ApiModule, DocNode};

/// Optional substring filters applied when rendering a full module document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingOptions {
    /// Filter for the module's classes.
    pub class: Option<String>,
    /// Filter for the module's methods and submodules.
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocsFormatter;

impl DocsFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Doubles every newline so each source line renders as its own paragraph.
    pub fn format_content(&self, content: &str) -> String {
        content.replace('\n', "\n\n")
    }

    /// Heading, name line and a flat list of method titles: the module's own
    /// methods followed by those of its direct submodules.
    pub fn format_module_summary(&self, module: &ApiModule) -> String {
        let title = module
            .display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&module.text_raw);

        let mut content = format!("## {} ({})\n", title, module.name);
        content.push_str(&format!("Module name or Class name: `{}`\n\n", module.name));

        if !module.methods().is_empty() || !module.submodules.is_empty() {
            content.push_str("### Methods\n");

            let submodule_methods = module.submodules.iter().flat_map(|sub| sub.methods());
            for method in module.methods().iter().chain(submodule_methods) {
                content.push_str(&format!("#### {}\n", method.text_raw));
            }
        }

        content.push('\n');
        content
    }

    /// Renders one section of `items`.
    ///
    /// Items matching `query` (case-insensitive, on title or description) are
    /// listed under `## {title}`. Nested methods are then listed for every
    /// item, whether or not it matched; an item carrying an empty `methods`
    /// list still gets its header.
    pub fn format_items<T: DocNode>(&self, items: &[T], title: &str, query: Option<&str>) -> String {
        if items.is_empty() {
            return String::new();
        }

        let query = query.filter(|q| !q.is_empty()).map(str::to_lowercase);
        let matches = |item: &&T| match &query {
            Some(q) => {
                item.text_raw().to_lowercase().contains(q)
                    || item.desc().is_some_and(|desc| desc.to_lowercase().contains(q))
            }
            None => true,
        };

        let mut section = String::new();

        let filtered: Vec<&T> = items.iter().filter(matches).collect();
        if !filtered.is_empty() {
            section.push_str(&format!("## {}\n\n", title));
            for item in filtered {
                self.push_entry(&mut section, "###", item);
            }
        }

        for item in items {
            let Some(methods) = item.nested_methods() else {
                continue;
            };
            section.push_str(&format!("### {} Methods\n\n", item.text_raw()));
            for method in methods {
                self.push_entry(&mut section, "####", method);
            }
        }

        section
    }

    pub fn create_module_documentation(&self, module: &ApiModule, options: &FormattingOptions) -> String {
        let mut content = format!("# {}\n\n", module.text_raw);

        if let Some(desc) = module.desc.as_deref().filter(|d| !d.is_empty()) {
            content.push_str(&format!("## Description\n{}\n\n", self.format_content(desc)));
        }

        content.push_str(&self.format_items(&module.classes, "Classes", options.class.as_deref()));
        content.push_str(&self.format_items(module.methods(), "Methods", options.method.as_deref()));
        content.push_str(&self.format_items(&module.submodules, "Submodules", options.method.as_deref()));

        content
    }

    fn push_entry<T: DocNode + ?Sized>(&self, out: &mut String, heading: &str, item: &T) {
        out.push_str(&format!("{} {}\n", heading, item.text_raw()));
        if let Some(desc) = item.desc().filter(|d| !d.is_empty()) {
            out.push_str(&format!("{}\n\n", self.format_content(desc)));
        }
    }
}
