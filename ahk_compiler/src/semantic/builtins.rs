//! Names of built-in functions and classes

const BUILTIN_FUNCTIONS: &[&str] = &[
    // Input and output
    "MsgBox", "InputBox", "ToolTip", "TrayTip", "Send", "SendText", "SendInput",
    "SendPlay", "SendEvent", "Click", "MouseMove", "MouseClick", "MouseClickDrag",
    "KeyWait", "GetKeyState", "Hotkey", "Hotstring",
    // Flow and timing
    "Sleep", "SetTimer", "ExitApp", "Reload", "Suspend", "Pause", "Critical",
    // Windows
    "WinActivate", "WinClose", "WinExist", "WinActive", "WinWait", "WinWaitActive",
    "WinGetTitle", "WinSetTitle", "WinMove", "WinRestore", "WinMaximize", "WinMinimize",
    "ControlClick", "ControlSend", "ControlGetText", "ControlSetText",
    // Files
    "FileRead", "FileAppend", "FileDelete", "FileCopy", "FileMove", "FileExist",
    "FileGetSize", "FileGetTime", "FileOpen", "DirCreate", "DirDelete", "DirExist",
    // Strings
    "StrSplit", "StrReplace", "StrLower", "StrUpper", "StrTitle", "SubStr", "StrLen",
    "InStr", "Trim", "LTrim", "RTrim", "Format", "RegExMatch", "RegExReplace",
    "Sort", "StrCompare",
    // Types and objects
    "Array", "Map", "Object", "IsObject", "IsSet", "IsInteger", "IsNumber", "Type",
    "HasProp", "HasMethod", "ObjOwnPropCount",
    // Processes and system
    "Run", "RunWait", "ProcessExist", "ProcessClose", "SoundPlay", "SoundBeep",
    "EnvGet", "EnvSet", "DllCall", "ComObject",
    // Registry
    "RegRead", "RegWrite", "RegDelete",
    // Math and conversion
    "Abs", "Ceil", "Floor", "Round", "Sqrt", "Sin", "Cos", "Tan", "Exp", "Log", "Ln",
    "Max", "Min", "Mod", "Random", "Chr", "Ord", "Number", "String", "Integer", "Float",
    // GUI
    "Gui", "Menu",
];

const BUILTIN_CLASSES: &[&str] = &[
    "Any", "Object", "Array", "Map", "Buffer", "Class", "Error", "Func", "Gui",
    "Integer", "Float", "Number", "String", "Primitive", "Menu", "File",
    "IndexError", "KeyError", "MemberError", "MethodError", "OSError", "TargetError",
    "TimeoutError", "TypeError", "UnsetError", "ValueError", "ZeroDivisionError",
];

/// Case-insensitive, as AutoHotkey names are
pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.iter().any(|b| b.eq_ignore_ascii_case(name))
}

pub fn is_builtin_class(name: &str) -> bool {
    BUILTIN_CLASSES.iter().any(|b| b.eq_ignore_ascii_case(name))
}

/// `A_ScriptDir`, `A_Index`, ...
pub fn is_builtin_variable(name: &str) -> bool {
    name.len() > 2 && name.get(..2).map_or(false, |prefix| prefix.eq_ignore_ascii_case("a_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert!(is_builtin_function("msgbox"));
        assert!(is_builtin_class("valueerror"));
        assert!(is_builtin_variable("a_Index"));
        assert!(!is_builtin_variable("A_"));
        assert!(!is_builtin_function("MyHelper"));
    }
}
