fn main() {
    // ESP-IDF sysenv propagation is only meaningful when building the
    // firmware binary for the espidf target; host-side test builds skip it.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
