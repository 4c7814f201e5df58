fn main() {
    #[cfg(feature = "ui")]
    {
        let config = tasmota_mqtt_ui::config::PluginConfig::default();

        tasmota_mqtt_ui::host::init_logger(&config);

        yew::Renderer::<tasmota_mqtt_ui::ui::App>::new().render();
    }
}
