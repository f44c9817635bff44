//! HTML rendering through a small placeholder template.
//!
//! Placeholders: `{name}`, `{content_type}`, `{id}`, `{size}`, `{size_human}`,
//! `{src}`. Text values are HTML-escaped. `{src}` is the caller-assigned
//! `img_src` when present, otherwise a `data:` URI of the content.

use humansize::{format_size, DECIMAL};

use crate::model::attachment::Attachment;
use crate::parser::classify::MediaCategory;

use super::AttachmentView;

/// Registry name of the template mask.
pub const TEMPLATE_MASK: &str = "template";

const IMAGE_TEMPLATE: &str = r#"<img src="{src}" alt="{name}" title="{name}">"#;
const LINK_TEMPLATE: &str = r#"<a href="{src}" download="{name}">{name}</a> ({size_human})"#;

/// Templated view over an attachment.
#[derive(Debug, Clone)]
pub struct TemplateMask<'a> {
    parent: &'a Attachment,
    template: String,
}

impl<'a> TemplateMask<'a> {
    /// Images render as `<img>`, everything else as a download link.
    pub fn new(parent: &'a Attachment) -> Self {
        let template = match parent.media_type() {
            MediaCategory::Image => IMAGE_TEMPLATE,
            _ => LINK_TEMPLATE,
        };
        Self::with_template(parent, template)
    }

    pub fn with_template(parent: &'a Attachment, template: impl Into<String>) -> Self {
        Self {
            parent,
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn src(&self) -> String {
        match self.parent.img_src() {
            Some(src) => src.to_string(),
            None => self.image_src(),
        }
    }

    fn placeholder(&self, key: &str) -> Option<String> {
        let a = self.parent;
        Some(match key {
            "name" => escape_html(a.name().unwrap_or("attachment")),
            "content_type" => escape_html(a.content_type()),
            "id" => escape_html(a.id().unwrap_or_default()),
            "size" => a.size().to_string(),
            "size_human" => format_size(a.size(), DECIMAL),
            "src" => escape_html(&self.src()),
            _ => return None,
        })
    }
}

/// Registry entry for [`TemplateMask`].
pub fn factory(attachment: &Attachment) -> Box<dyn AttachmentView + '_> {
    Box::new(TemplateMask::new(attachment))
}

impl AttachmentView for TemplateMask<'_> {
    fn mask_name(&self) -> &str {
        TEMPLATE_MASK
    }

    fn parent(&self) -> &Attachment {
        self.parent
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let expanded = after
                .find('}')
                .and_then(|close| self.placeholder(&after[..close]).map(|v| (close, v)));
            match expanded {
                Some((close, value)) => {
                    out.push_str(&value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
