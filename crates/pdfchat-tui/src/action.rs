/// Actions that the TUI can process, mapped from keyboard input or internal events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    FocusNext,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoTop,
    GoBottom,
    /// Open the path prompt to choose files for upload.
    SelectFiles,
    ClearSelection,
    Upload,
    DeleteSelected,
    Refresh,
    Reprocess,
    InsertChar(char),
    Backspace,
    Submit,
    Cancel,
    Tick,
    Resize(u16, u16),
    None,
}
