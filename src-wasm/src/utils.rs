use chrono::NaiveDate;
use wasm_bindgen::JsValue;

pub fn set_panic_hook() {
    // Better error messages when the engine panics in the browser
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Convert any displayable error into a JS string value
pub fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {err}"))
}

/// Today's date according to the host clock
pub fn host_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}
