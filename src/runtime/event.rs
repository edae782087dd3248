/// Actions emitted by widgets in `InteractionResult`, flowing upward to
/// whichever component owns the staged value (and ultimately the panel).
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetAction {
    /// A value somewhere below changed; owners re-read `value()` and
    /// replace their snapshot wholesale.
    Edited,
    /// The focused widget is done with its value; the form treats this as
    /// a submit request.
    InputDone,
    /// Transient user-facing message for the notice queue.
    Notify { message: String },
}
