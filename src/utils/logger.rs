use env_logger::{Builder, Env};
use std::io::Write;

const DEFAULT_FILTER: &str = "warn,subwave=info";

pub fn init_logger() {
    // Установка базового фильтра и переопределение через RUST_LOG
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    let mut builder = Builder::from_env(env);
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    // Повторная инициализация (например, из тестов) не считается ошибкой
    let _ = builder.try_init();
}
