fn main() {
    println!("cargo:rerun-if-env-changed=TILLM_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=TILLM_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=TILLM_PROVISION_URL");
    println!("cargo:rerun-if-env-changed=TILLM_ASK_URL");
    println!("cargo:rerun-if-env-changed=TILLM_FACTORY_SECRET");
    println!("cargo:rerun-if-env-changed=TILLM_CA_PEM");

    // Configuration is baked in via option_env! at compile time.
    if std::env::var("TILLM_FACTORY_SECRET").is_err() {
        println!("cargo:warning=TILLM_FACTORY_SECRET not set; firmware will refuse to boot");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
