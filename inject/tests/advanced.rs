use fibre_inject::{component, contract, init, providers, Container, Provider};
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

// --- Test Fixtures ---

type Log = Rc<RefCell<Vec<&'static str>>>;

#[derive(Clone, Debug, PartialEq)]
struct Settings {
  name: String,
}

#[derive(Clone)]
struct Pool;

#[derive(Clone)]
struct Cache;

#[derive(Clone)]
struct Mailer;

#[derive(Clone)]
struct App;

trait Lister: Send + Sync {
  fn list(&self) -> Vec<String>;
}

struct Directory;

impl Lister for Directory {
  fn list(&self) -> Vec<String> {
    vec!["Sarah".to_string(), "Bob".to_string()]
  }
}

contract!(dyn Lister);
component!(Settings);
component!(Pool);
component!(Cache);
component!(Mailer);
component!(App);

// --- Ordering ---

#[test]
fn test_diamond_runs_shared_dependency_once() {
  // Arrange: App needs Cache and Mailer, and both of those need Pool.
  let log = Log::default();
  let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());

  // Act
  let result = init(providers![
    move |_cache: Cache, _mailer: Mailer| -> App {
      a.borrow_mut().push("app");
      App
    },
    move |_pool: Arc<Pool>| -> Mailer {
      b.borrow_mut().push("mailer");
      Mailer
    },
    move |_pool: Pool| -> Cache {
      c.borrow_mut().push("cache");
      Cache
    },
    move || -> Arc<Pool> {
      d.borrow_mut().push("pool");
      Arc::new(Pool)
    }
  ]);

  // Assert: arguments resolve left to right.
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*log.borrow(), vec!["pool", "cache", "mailer", "app"]);
}

#[test]
fn test_diamond_order_ignores_declaration_order_of_middle_factories() {
  // Arrange: same graph as above with the two middle factories swapped.
  let log = Log::default();
  let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());

  // Act
  let result = init(providers![
    move |_cache: Cache, _mailer: Mailer| -> App {
      a.borrow_mut().push("app");
      App
    },
    move |_pool: Pool| -> Cache {
      c.borrow_mut().push("cache");
      Cache
    },
    move |_pool: Arc<Pool>| -> Mailer {
      b.borrow_mut().push("mailer");
      Mailer
    },
    move || -> Arc<Pool> {
      d.borrow_mut().push("pool");
      Arc::new(Pool)
    }
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*log.borrow(), vec!["pool", "cache", "mailer", "app"]);
}

#[test]
fn test_independent_roots_run_in_declaration_order() {
  let log = Log::default();
  let (a, b, c) = (log.clone(), log.clone(), log.clone());

  let result = init(providers![
    move || a.borrow_mut().push("first"),
    move || b.borrow_mut().push("second"),
    move || c.borrow_mut().push("third")
  ]);

  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_factory_used_by_many_runs_once() {
  // Arrange
  let calls = Rc::new(Cell::new(0));
  let counter = calls.clone();
  let seen = Rc::new(Cell::new(0));
  let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());

  // Act
  let result = init(providers![
    move |_pool: Pool| s1.set(s1.get() + 1),
    move |_pool: Arc<Pool>| s2.set(s2.get() + 1),
    move || {
      counter.set(counter.get() + 1);
      Pool
    },
    move |_pool: Pool| s3.set(s3.get() + 1)
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(calls.get(), 1);
  assert_eq!(seen.get(), 3);
}

#[test]
fn test_first_factory_for_a_type_wins_but_both_run() {
  // Arrange
  let log = Log::default();
  let (a, b, c) = (log.clone(), log.clone(), log.clone());

  // Act
  let result = init(providers![
    move |settings: Settings| {
      let name: &'static str = if settings.name == "primary" { "saw primary" } else { "saw other" };
      a.borrow_mut().push(name);
    },
    move || {
      b.borrow_mut().push("primary");
      Settings {
        name: "primary".to_string(),
      }
    },
    move || {
      c.borrow_mut().push("secondary");
      Settings {
        name: "secondary".to_string(),
      }
    }
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*log.borrow(), vec!["primary", "saw primary", "secondary"]);
}

#[test]
fn test_supplied_value_takes_precedence_over_factory() {
  // Arrange
  let received = Rc::new(RefCell::new(None));
  let sink = received.clone();

  // Act
  let result = init(providers![
    move |settings: Settings| *sink.borrow_mut() = Some(settings),
    || Settings {
      name: "from factory".to_string(),
    },
    Settings {
      name: "supplied".to_string(),
    }
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(
    *received.borrow(),
    Some(Settings {
      name: "supplied".to_string()
    })
  );
}

#[test]
fn test_tuple_outputs_bind_every_element() {
  // Arrange
  let calls = Rc::new(Cell::new(0));
  let counter = calls.clone();
  let log = Log::default();
  let (a, b) = (log.clone(), log.clone());

  // Act
  let result = init(providers![
    move |_cache: Cache| a.borrow_mut().push("cache"),
    move |_mailer: Arc<Mailer>| b.borrow_mut().push("mailer"),
    move || -> Result<(Cache, Arc<Mailer>), String> {
      counter.set(counter.get() + 1);
      Ok((Cache, Arc::new(Mailer)))
    }
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(calls.get(), 1);
  assert_eq!(*log.borrow(), vec!["cache", "mailer"]);
}

// --- Representation ---

#[test]
fn test_shared_consumers_receive_the_same_allocation() {
  // Arrange
  let handles: Rc<RefCell<Vec<Arc<Pool>>>> = Rc::default();
  let (a, b) = (handles.clone(), handles.clone());

  // Act
  let result = init(providers![
    move |pool: Arc<Pool>| a.borrow_mut().push(pool),
    move |pool: Arc<Pool>| b.borrow_mut().push(pool),
    || Arc::new(Pool)
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  let handles = handles.borrow();
  assert_eq!(handles.len(), 2);
  assert!(Arc::ptr_eq(&handles[0], &handles[1]));
}

#[test]
fn test_shared_consumers_of_an_owned_value_receive_fresh_copies() {
  // Arrange
  let handles: Rc<RefCell<Vec<Arc<Settings>>>> = Rc::default();
  let (a, b) = (handles.clone(), handles.clone());

  // Act
  let result = init(providers![
    move |settings: Arc<Settings>| a.borrow_mut().push(settings),
    move |settings: Arc<Settings>| b.borrow_mut().push(settings),
    Settings {
      name: "copied".to_string(),
    }
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  let handles = handles.borrow();
  assert_eq!(handles[0].name, "copied");
  assert_eq!(handles[0], handles[1]);
  assert!(!Arc::ptr_eq(&handles[0], &handles[1]));
}

#[test]
fn test_owned_consumer_of_a_shared_value_receives_a_copy() {
  // Arrange
  let received = Rc::new(RefCell::new(None));
  let sink = received.clone();
  let original = Arc::new(Settings {
    name: "shared".to_string(),
  });

  // Act
  let result = init(providers![
    move |settings: Settings| *sink.borrow_mut() = Some(settings),
    original.clone()
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(received.borrow().as_ref(), Some(&*original));
}

// --- Contract Outputs ---

#[test]
fn test_factory_returning_contract_feeds_contract_consumers() {
  // Arrange
  let calls = Rc::new(Cell::new(0));
  let counter = calls.clone();
  let handles: Rc<RefCell<Vec<Arc<dyn Lister>>>> = Rc::default();
  let (a, b) = (handles.clone(), handles.clone());

  // Act
  let result = init(providers![
    move |lister: Arc<dyn Lister>| a.borrow_mut().push(lister),
    move || -> Arc<dyn Lister> {
      counter.set(counter.get() + 1);
      Arc::new(Directory)
    },
    move |lister: Arc<dyn Lister>| b.borrow_mut().push(lister)
  ]);

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(calls.get(), 1);
  let handles = handles.borrow();
  assert_eq!(handles.len(), 2);
  assert_eq!(handles[0].list(), vec!["Sarah", "Bob"]);
  assert!(Arc::ptr_eq(&handles[0], &handles[1]));
}

#[test]
fn test_fallible_factory_returning_contract() {
  let names = Rc::new(RefCell::new(Vec::new()));
  let sink = names.clone();

  let result = init(providers![
    || -> Result<Arc<dyn Lister>, String> { Ok(Arc::new(Directory)) },
    move |lister: Arc<dyn Lister>| *sink.borrow_mut() = lister.list()
  ]);

  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*names.borrow(), vec!["Sarah", "Bob"]);
}

// --- Container API ---

#[test]
fn test_container_builder_and_extend() {
  // Arrange
  let log = Log::default();
  let (a, b) = (log.clone(), log.clone());
  let mut container = Container::new();
  assert!(container.is_empty());

  container.add(move |_pool: Pool| a.borrow_mut().push("consumer"));
  container.extend(providers![move || {
    b.borrow_mut().push("pool");
    Pool
  }]);
  container.extend([Provider::value(Settings {
    name: "unused".to_string(),
  })]);

  // Act
  assert_eq!(container.len(), 3);
  let result = container.run();

  // Assert
  assert!(result.is_ok(), "unexpected error: {:?}", result);
  assert_eq!(*log.borrow(), vec!["pool", "consumer"]);
}

#[test]
fn test_validate_does_not_invoke_factories() {
  let calls = Rc::new(Cell::new(0));
  let counter = calls.clone();

  let container: Container = providers![
    |_pool: Pool| {},
    move || {
      counter.set(counter.get() + 1);
      Pool
    }
  ]
  .into_iter()
  .collect();

  assert!(container.validate().is_ok());
  assert_eq!(calls.get(), 0);
}

#[test]
fn test_provider_kinds() {
  assert!(Provider::new(|| Pool).is_factory());
  assert!(!Provider::new(Pool).is_factory());
  assert!(!Provider::new(Arc::new(Pool)).is_factory());
  assert!(!Provider::nil().is_factory());
}
