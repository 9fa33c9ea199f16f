use clap::Parser;

use crate::{
  config::SkillConfig,
  envelope::ResponseEnvelope,
  error::Result,
  server::{self, ServerConfig},
  skill::{Intent, IntentRequest},
};

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
  #[clap(subcommand)]
  subcmd: SubCommand,

  #[clap(flatten)]
  skill: SkillConfig,
}

#[derive(Parser)]
enum SubCommand {
  Server(ServerConfig),
  Invoke(InvokeConfig),
}

#[derive(Parser)]
struct InvokeConfig {
  /// Intent or request type to invoke (Examples: "ReadTopFive",
  /// "LaunchRequest", "AMAZON.HelpIntent")
  intent: String,
  /// Value for the newsDate slot, in YYYY-MM-DD
  #[clap(long, short)]
  date: Option<String>,
  /// Print the JSON response envelope instead of the spoken text
  #[clap(long, short)]
  json: bool,
}

impl InvokeConfig {
  fn to_intent_request(&self) -> IntentRequest {
    IntentRequest::new(Intent::from_name(&self.intent, self.date.clone()))
  }
}

impl Cli {
  pub async fn run(self) -> Result<()> {
    self.skill.validate()?;
    let dispatcher = self.skill.build_dispatcher()?;

    match self.subcmd {
      SubCommand::Server(server_config) => {
        server::serve(server_config, &self.skill, dispatcher).await
      }
      SubCommand::Invoke(invoke_config) => {
        let req = invoke_config.to_intent_request();
        let resp = dispatcher.dispatch(&req).await;
        if invoke_config.json {
          let envelope = ResponseEnvelope::from(resp);
          println!("{}", serde_json::to_string_pretty(&envelope)?);
        } else {
          println!("{}", resp.speech);
        }
        Ok(())
      }
    }
  }
}
