use crate::widgets::traits::RenderContext;

#[derive(Debug, Clone)]
pub struct WidgetBase {
    id: String,
    label: String,
}

impl WidgetBase {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_focused(&self, ctx: &RenderContext) -> bool {
        ctx.focused_id.as_deref() == Some(self.id.as_str())
    }

    pub fn focus_marker(&self, focused: bool) -> &'static str {
        if focused { "❯ " } else { "  " }
    }

    /// `"❯ Label: "` / `"  Label: "` prefix for single-line inputs.
    pub fn input_prefix(&self, focused: bool) -> String {
        if self.label.is_empty() {
            return self.focus_marker(focused).to_string();
        }
        format!("{}{}: ", self.focus_marker(focused), self.label)
    }
}
