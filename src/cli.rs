use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 10.0)]
  pub tick_rate: f64,

  #[arg(
    short,
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 30.0
  )]
  pub frame_rate: f64,

  #[arg(long, value_name = "URL", env = "ITEM_ADMIN_API_URL", help = "Base url of the items API")]
  pub api_url: Option<String>,

  #[arg(
    long,
    value_name = "TOKEN",
    env = "ITEM_ADMIN_TOKEN",
    hide_env_values = true,
    help = "Bearer token for the API"
  )]
  pub token: Option<String>,
}
