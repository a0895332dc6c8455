use fibre_inject::{component, contract, providers, Container};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// 1. A tiny logger shared by every component.
struct Console {
  prefix: &'static str,
}

impl Console {
  fn println(&self, message: &str) {
    println!("{}{}", self.prefix, message);
  }
}

// 2. The abstraction the client depends on.
trait Lister: Send + Sync {
  fn list_people(&self) -> Vec<String>;
}

// 3. A concrete service implementing it.
struct Service {
  log: Arc<Console>,
}

impl Lister for Service {
  fn list_people(&self) -> Vec<String> {
    self.log.println("Client asked for a list of people");
    vec!["Sarah".to_string(), "Bob".to_string(), "André".to_string()]
  }
}

// 4. The client only knows about `dyn Lister`.
struct Client {
  log: Arc<Console>,
  svc: Arc<dyn Lister>,
}

impl Client {
  fn print_people(&self) {
    let people = self.svc.list_people();
    self.log.println(&format!("People: {}", people.join(", ")));
  }
}

contract!(dyn Lister);
component!(Console);
component!(Service: dyn Lister);
component!(Client);

fn new_client(log: Arc<Console>, svc: Arc<dyn Lister>) -> Arc<Client> {
  log.println("Initializing client");
  Arc::new(Client { log, svc })
}

fn new_service(log: Arc<Console>) -> Arc<Service> {
  log.println("Initializing service");
  Arc::new(Service { log })
}

fn main() {
  // Run with RUST_LOG=fibre_inject=debug to watch the engine work.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let console = Arc::new(Console { prefix: "[app] " });
  let use_client = |client: Arc<Client>| client.print_people();

  // Declaration order is irrelevant: the service is built first because the
  // client needs a `dyn Lister`, and `use_client` runs last.
  let container: Container = providers![new_client, use_client, new_service, console]
    .into_iter()
    .collect();

  if let Err(err) = container.run() {
    eprintln!("initialization failed: {}", err);
  }

  // Output:
  // [app] Initializing service
  // [app] Initializing client
  // [app] Client asked for a list of people
  // [app] People: Sarah, Bob, André
}
