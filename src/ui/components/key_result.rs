/// What a component did with a key event.
///
/// Components run before the view's own key handling; `NotHandled` lets the
/// key fall through to the next handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the parent to do
  Handled,
  /// Key was consumed and produced an event for the parent
  Event(T),
  /// Key was not consumed
  NotHandled,
}
