use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::new().filter("FOOD_LOG").write_style("FOOD_LOG_STYLE"),
    )
    .init();

    match driver::main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
