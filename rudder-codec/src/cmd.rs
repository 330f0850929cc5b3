//! Symbolic command names known to the W3C dialect.
//!
//! These are the registry keys used by [`crate::W3cCodec`]. Encoding accepts
//! any `&str`, so vendor extensions registered at runtime do not need a
//! constant here.

// Session lifecycle
pub const STATUS: &str = "status";
pub const NEW_SESSION: &str = "newSession";
pub const QUIT: &str = "quit";
pub const GET_TIMEOUTS: &str = "getTimeouts";
pub const SET_TIMEOUT: &str = "setTimeout";

// Navigation
pub const GET: &str = "get";
pub const GET_CURRENT_URL: &str = "getCurrentUrl";
pub const GO_BACK: &str = "goBack";
pub const GO_FORWARD: &str = "goForward";
pub const REFRESH: &str = "refresh";
pub const GET_TITLE: &str = "getTitle";

// Windows
pub const GET_CURRENT_WINDOW_HANDLE: &str = "getCurrentWindowHandle";
pub const GET_WINDOW_HANDLES: &str = "getWindowHandles";
pub const CLOSE: &str = "close";
pub const SWITCH_TO_WINDOW: &str = "switchToWindow";
pub const SWITCH_TO_NEW_WINDOW: &str = "switchToNewWindow";
pub const GET_CURRENT_WINDOW_SIZE: &str = "getCurrentWindowSize";
pub const SET_CURRENT_WINDOW_SIZE: &str = "setCurrentWindowSize";
pub const GET_WINDOW_POSITION: &str = "getWindowPosition";
pub const SET_WINDOW_POSITION: &str = "setWindowPosition";
pub const MAXIMIZE_CURRENT_WINDOW: &str = "maximizeCurrentWindow";
pub const MINIMIZE_CURRENT_WINDOW: &str = "minimizeCurrentWindow";
pub const FULLSCREEN_CURRENT_WINDOW: &str = "fullscreenCurrentWindow";

// Frames
pub const SWITCH_TO_FRAME: &str = "switchToFrame";
pub const SWITCH_TO_PARENT_FRAME: &str = "switchToParentFrame";

// Element lookup
pub const FIND_ELEMENT: &str = "findElement";
pub const FIND_ELEMENTS: &str = "findElements";
pub const FIND_CHILD_ELEMENT: &str = "findChildElement";
pub const FIND_CHILD_ELEMENTS: &str = "findChildElements";
pub const GET_ACTIVE_ELEMENT: &str = "getActiveElement";
pub const GET_ELEMENT_SHADOW_ROOT: &str = "getElementShadowRoot";
pub const FIND_ELEMENT_FROM_SHADOW_ROOT: &str = "findElementFromShadowRoot";
pub const FIND_ELEMENTS_FROM_SHADOW_ROOT: &str = "findElementsFromShadowRoot";

// Element interaction
pub const CLICK_ELEMENT: &str = "clickElement";
pub const CLEAR_ELEMENT: &str = "clearElement";
pub const SEND_KEYS_TO_ELEMENT: &str = "sendKeysToElement";
pub const SUBMIT_ELEMENT: &str = "submitElement";

// Element state
pub const GET_ELEMENT_TEXT: &str = "getElementText";
pub const GET_ELEMENT_TAG_NAME: &str = "getElementTagName";
pub const GET_ELEMENT_RECT: &str = "getElementRect";
pub const GET_ELEMENT_SIZE: &str = "getElementSize";
pub const GET_ELEMENT_LOCATION: &str = "getElementLocation";
pub const GET_ELEMENT_LOCATION_ONCE_SCROLLED_INTO_VIEW: &str =
    "getElementLocationOnceScrolledIntoView";
pub const IS_ELEMENT_SELECTED: &str = "isElementSelected";
pub const IS_ELEMENT_ENABLED: &str = "isElementEnabled";
pub const IS_ELEMENT_DISPLAYED: &str = "isElementDisplayed";
pub const GET_ELEMENT_DOM_ATTRIBUTE: &str = "getElementDomAttribute";
pub const GET_ELEMENT_DOM_PROPERTY: &str = "getElementDomProperty";
pub const GET_ELEMENT_ATTRIBUTE: &str = "getElementAttribute";
pub const GET_ELEMENT_VALUE_OF_CSS_PROPERTY: &str = "getElementValueOfCssProperty";
pub const GET_ELEMENT_ARIA_ROLE: &str = "getElementAriaRole";
pub const GET_ELEMENT_ACCESSIBLE_NAME: &str = "getElementAccessibleName";

// Script execution
pub const EXECUTE_SCRIPT: &str = "executeScript";
pub const EXECUTE_ASYNC_SCRIPT: &str = "executeAsyncScript";

// Page state
pub const GET_PAGE_SOURCE: &str = "getPageSource";

// Cookies
pub const GET_COOKIES: &str = "getCookies";
pub const GET_COOKIE: &str = "getCookie";
pub const ADD_COOKIE: &str = "addCookie";
pub const DELETE_COOKIE: &str = "deleteCookie";
pub const DELETE_ALL_COOKIES: &str = "deleteAllCookies";

// Input actions
pub const ACTIONS: &str = "actions";
pub const CLEAR_ACTION_STATE: &str = "clearActionState";

// Alerts
pub const ACCEPT_ALERT: &str = "acceptAlert";
pub const DISMISS_ALERT: &str = "dismissAlert";
pub const GET_ALERT_TEXT: &str = "getAlertText";
pub const SET_ALERT_VALUE: &str = "setAlertValue";

// Screenshots & printing
pub const SCREENSHOT: &str = "screenshot";
pub const ELEMENT_SCREENSHOT: &str = "elementScreenshot";
pub const PRINT_PAGE: &str = "printPage";

// File upload
pub const UPLOAD_FILE: &str = "uploadFile";

// Selenium-dialect logging endpoints
pub const GET_LOG: &str = "getLog";
pub const GET_AVAILABLE_LOG_TYPES: &str = "getAvailableLogTypes";

// Local storage (script-emulated)
pub const CLEAR_LOCAL_STORAGE: &str = "clearLocalStorage";
pub const GET_LOCAL_STORAGE_KEYS: &str = "getLocalStorageKeys";
pub const SET_LOCAL_STORAGE_ITEM: &str = "setLocalStorageItem";
pub const REMOVE_LOCAL_STORAGE_ITEM: &str = "removeLocalStorageItem";
pub const GET_LOCAL_STORAGE_ITEM: &str = "getLocalStorageItem";
pub const GET_LOCAL_STORAGE_SIZE: &str = "getLocalStorageSize";

// Session storage (script-emulated)
pub const CLEAR_SESSION_STORAGE: &str = "clearSessionStorage";
pub const GET_SESSION_STORAGE_KEYS: &str = "getSessionStorageKey";
pub const SET_SESSION_STORAGE_ITEM: &str = "setSessionStorageItem";
pub const REMOVE_SESSION_STORAGE_ITEM: &str = "removeSessionStorageItem";
pub const GET_SESSION_STORAGE_ITEM: &str = "getSessionStorageItem";
pub const GET_SESSION_STORAGE_SIZE: &str = "getSessionStorageSize";
