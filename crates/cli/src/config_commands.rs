use {
    clap::Subcommand,
    smsgate_config::{ReceiveMethod, SmsGateConfig, loader},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config (or one key) as TOML.
    Get { key: Option<String> },
    /// Set a config key and save the file.
    Set { key: String, value: String },
    /// Print the resolved config file path.
    Path,
}

pub fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = loader::discover_and_load();
            match key {
                None => print!("{}", toml::to_string_pretty(&config)?),
                Some(key) => println!("{}", lookup(&config, &key)?),
            }
            Ok(())
        },
        ConfigAction::Set { key, value } => {
            // Validate before touching the file.
            let apply = parse_assignment(&key, &value)?;
            let path = loader::update_config(apply)?;
            println!("wrote {}", path.display());
            Ok(())
        },
        ConfigAction::Path => {
            println!("{}", loader::find_or_default_config_path().display());
            Ok(())
        },
    }
}

fn lookup(config: &SmsGateConfig, key: &str) -> anyhow::Result<String> {
    Ok(match key {
        "gateway.bind" => config.gateway.bind.clone(),
        "gateway.port" => config.gateway.port.to_string(),
        "gateway.path" => config.gateway.path.clone(),
        "gateway.method" => config.gateway.method.as_str().to_string(),
        "gateway.password.required" => config.gateway.password.required.to_string(),
        "gateway.password.value" => config.gateway.password.value.clone(),
        _ => anyhow::bail!("unknown config key: {key}"),
    })
}

type Assignment = Box<dyn FnOnce(&mut SmsGateConfig)>;

fn parse_assignment(key: &str, value: &str) -> anyhow::Result<Assignment> {
    let owned = value.to_string();
    Ok(match key {
        "gateway.bind" => Box::new(move |c| c.gateway.bind = owned),
        "gateway.port" => {
            let port: u16 = value.parse().map_err(|e| anyhow::anyhow!("bad port: {e}"))?;
            Box::new(move |c| c.gateway.port = port)
        },
        "gateway.path" => Box::new(move |c| c.gateway.path = owned),
        "gateway.method" => {
            let method = match value.to_ascii_uppercase().as_str() {
                "GET" => ReceiveMethod::Get,
                "POST" => ReceiveMethod::Post,
                other => anyhow::bail!("bad method: {other} (expected GET or POST)"),
            };
            Box::new(move |c| c.gateway.method = method)
        },
        "gateway.password.required" => {
            let required: bool = value
                .parse()
                .map_err(|e| anyhow::anyhow!("bad bool: {e}"))?;
            Box::new(move |c| c.gateway.password.required = required)
        },
        "gateway.password.value" => Box::new(move |c| c.gateway.password.value = owned),
        _ => anyhow::bail!("unknown config key: {key}"),
    })
}
