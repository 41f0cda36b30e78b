pub fn try_init_logger_for_default_harness() {
    let _ = env_logger::builder().is_test(true).try_init();
}
