#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    homefix_desktop_lib::run()
}
