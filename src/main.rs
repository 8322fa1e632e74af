use std::process::ExitCode;

fn main() -> ExitCode {
    craft_monitor_lib::run()
}
