// tests/interop_tests.rs

use molang::{
    Environment, EvalError, HostBindings, Value, compile, register_host_type,
    structs::{InteropStruct, new_struct},
};
use pretty_assertions::assert_eq;
use std::{cell::RefCell, rc::Rc};

#[derive(Default)]
struct Entity {
    id: u32,
    health: f64,
    name: String,
    alive: bool,
    level: i32,
    inventory: Vec<f64>,
    target: Option<Rc<RefCell<Entity>>>,
    world: Option<Rc<Environment>>,
}

fn register() {
    register_host_type(
        HostBindings::<Entity>::new()
            .readonly(&["id"], |e| e.id)
            .property(&["health", "hp"], |e| e.health, |e, v: f64| e.health = v)
            .property(&["name"], |e| e.name.clone(), |e, v: String| e.name = v)
            .property(&["alive", "is_alive"], |e| e.alive, |e, v: bool| e.alive = v)
            .property(&["level"], |e| e.level, |e, v: i32| e.level = v)
            .readonly(&["inventory"], |e| e.inventory.clone())
            .readonly(&["target"], |e| match &e.target {
                Some(target) => InteropStruct::new(Rc::clone(target))
                    .map(|s| Value::Struct(new_struct(s)))
                    .unwrap_or_default(),
                None => Value::ZERO,
            })
            .readonly(&["world"], |e| match &e.world {
                Some(world) => Value::Environment(Rc::clone(world)),
                None => Value::ZERO,
            })
            .function(&["damage", "hurt"], |e, params| {
                e.health -= params.get_number(0)?;
                Ok(e.health)
            })
            .function(&["greet"], |e, params| {
                Ok(format!("{} greets {}", e.name, params.get_string(0)?))
            }),
    );
}

fn setup(entity: Entity) -> (Environment, Rc<RefCell<Entity>>) {
    register();
    let env = Environment::with_seed(0);
    let host = Rc::new(RefCell::new(entity));
    env.bind_host("query", Rc::clone(&host)).unwrap();
    (env, host)
}

fn run(env: &Environment, source: &str) -> Result<Value, EvalError> {
    compile(source).unwrap().evaluate(env, None).map_err(|e| e.error)
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_write_then_read_back() {
    let (env, host) = setup(Entity::default());
    assert_eq!(run(&env, "q.health = 17.5; return q.health;"), Ok(Value::from(17.5)));
    assert_eq!(host.borrow().health, 17.5);
}

#[test]
fn test_aliases_and_case() {
    let (env, host) = setup(Entity {
        health: 3.0,
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.HP"), Ok(Value::from(3.0)));
    run(&env, "query.Hp = 9").unwrap();
    assert_eq!(host.borrow().health, 9.0);
}

#[test]
fn test_readonly_write_fails_and_keeps_value() {
    let (env, host) = setup(Entity {
        id: 4,
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.id = 10"), Err(EvalError::ReadOnly("id".to_string())));
    assert_eq!(host.borrow().id, 4);
    assert_eq!(run(&env, "q.id"), Ok(Value::from(4.0)));
}

#[test]
fn test_write_coercion() {
    let (env, host) = setup(Entity::default());
    run(&env, "q.name = 5; q.alive = 0.5; q.level = 2.7;").unwrap();
    let entity = host.borrow();
    assert_eq!(entity.name, "5");
    assert!(entity.alive);
    assert_eq!(entity.level, 2);
}

#[test]
fn test_bool_reads_as_number() {
    let (env, _) = setup(Entity {
        alive: true,
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.is_alive ? 10 : 20"), Ok(Value::from(10.0)));
}

#[test]
fn test_unknown_members() {
    let (env, _) = setup(Entity::default());
    assert_eq!(run(&env, "q.mana"), Ok(Value::ZERO));
    assert!(matches!(run(&env, "q.mana = 1"), Err(EvalError::InvalidPath(_))));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_mutates_host() {
    let (env, host) = setup(Entity {
        health: 20.0,
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.damage(5)"), Ok(Value::from(15.0)));
    assert_eq!(run(&env, "q.hurt(2.5) ; return q.health;"), Ok(Value::from(12.5)));
    assert_eq!(host.borrow().health, 12.5);
}

#[test]
fn test_function_arguments_are_typed() {
    let (env, _) = setup(Entity {
        name: "steve".to_string(),
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.greet('alex')"), Ok(Value::from("steve greets alex")));
    assert_eq!(
        run(&env, "q.greet(1)"),
        Err(EvalError::TypeMismatch {
            expected: "string",
            found: "number"
        })
    );
    assert_eq!(run(&env, "q.damage()"), Err(EvalError::MissingArgument { index: 0 }));
}

// ============================================================================
// Nested Values
// ============================================================================

#[test]
fn test_collection_member() {
    let (env, _) = setup(Entity {
        inventory: vec![1.0, 2.0, 3.0],
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.inventory[1]"), Ok(Value::from(2.0)));
    assert_eq!(run(&env, "q.inventory[4]"), Ok(Value::from(2.0)));
    assert_eq!(
        run(&env, "t.s = 0; for_each(t.i, q.inventory, { t.s = t.s + t.i; }); return t.s;"),
        Ok(Value::from(6.0))
    );
}

#[test]
fn test_nested_host_object() {
    let target = Rc::new(RefCell::new(Entity {
        health: 8.0,
        ..Entity::default()
    }));
    let (env, _) = setup(Entity {
        target: Some(Rc::clone(&target)),
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.target.health"), Ok(Value::from(8.0)));
    run(&env, "q.target.health = 1").unwrap();
    assert_eq!(target.borrow().health, 1.0);
}

#[test]
fn test_missing_nested_object_is_not_a_struct() {
    let (env, _) = setup(Entity::default());
    assert_eq!(run(&env, "q.target.health"), Ok(Value::ZERO));
    assert_eq!(
        run(&env, "q.target.health = 1"),
        Err(EvalError::NotAStruct("target".to_string()))
    );
}

#[test]
fn test_arrow_into_host_environment() {
    let world = Rc::new(Environment::with_seed(1));
    compile("v.time = 12").unwrap().evaluate(&world, None).unwrap();
    let (env, _) = setup(Entity {
        world: Some(world),
        ..Entity::default()
    });
    assert_eq!(run(&env, "q.world -> v.time"), Ok(Value::from(12.0)));
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_unregistered_host_type() {
    struct Stranger;
    let env = Environment::with_seed(0);
    let err = env.bind_host("query", Rc::new(RefCell::new(Stranger))).unwrap_err();
    assert!(matches!(err, EvalError::UnregisteredHostType(_)));
}

#[test]
fn test_explicit_bindings() {
    struct Clock {
        time: f64,
    }
    let env = Environment::with_seed(0);
    let bindings = HostBindings::<Clock>::new().readonly(&["anim_time"], |c| c.time);
    env.bind_host_with("query", Rc::new(RefCell::new(Clock { time: 0.25 })), bindings.into());
    assert_eq!(run(&env, "q.anim_time * 4"), Ok(Value::from(1.0)));
}
