//! Documentation content for the molang CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Roots,
    Math,
    Control,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "roots" | "root" | "scopes" => Some(Self::Roots),
            "math" | "functions" => Some(Self::Math),
            "control" | "control_flow" | "loops" => Some(Self::Control),
            "types" | "type" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"MOLANG DOCUMENTATION

MoLang is a small expression language for data-driven animation and behavior.
Formulas read and write named values through dotted paths, call math
functions, and return a number or a string.

DOCUMENTATION CATEGORIES

  syntax            Literals, paths, statements, and blocks
  operators         Arithmetic, comparison, logical, ternary, and coalesce
  roots             The variable, temp, context, math, and query roots
  math              The math.* function library
  control           loop, for_each, break, continue, and return
  types             Numbers, strings, structs, and truthiness

QUICK REFERENCE

  v.x = 1;          Assign a variable (v is short for variable)
  t.x               Temporary value, cleared after each evaluation
  c.x               Read-only context value
  q.anim_time       Host query
  math.sin(90)      Function call (degrees)
  a ? b : c         Ternary (b only when a is exactly 1)
  a ?? b            b when a is 0

Run 'molang doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::parse(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Roots) => Ok(ROOTS_DOC),
        Some(DocCategory::Math) => Ok(MATH_DOC),
        Some(DocCategory::Control) => Ok(CONTROL_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Literals, Paths, and Statements

LITERALS
  1, 0.5, .25       Numbers (always 64-bit floating point)
  'text', "text"    Strings (no escape sequences)
  true, false       Booleans, stored as 1 and 0

PATHS
  root.member.member
    A dotted name. The first segment picks a root, the rest are handed
    to that root's struct.

    Example:
      Formula: variable.pos.x
      Reads member "x" of member "pos" of the variable store.

    Shorthand roots:
      v -> variable    t -> temp    c -> context    q -> query

    Constraints:
      - Names are case-insensitive
      - A name may contain letters, digits, underscores, and dots

INDEXING
  v.list[i]
    Reads element i of an array. Reads wrap around the length;
    writes past the end grow the array.

    Example:
      Formula: array.items[5]      (items has 3 elements)
      Output:  the same value as array.items[2]

STATEMENTS
  a; b; c
    Statements are separated by ';'. A trailing ';' is allowed.
    Without 'return', the value of a multi-statement formula is the
    value of its last statement.

    Example:
      Formula: v.foo = 5; return v.foo;
      Output:  5

BLOCKS
  { statement; statement; }
    Groups statements for loop and for_each bodies.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Arithmetic, Comparison, and Logic

PRECEDENCE (tightest first)
  ->                Arrow (evaluate right side in left side's environment)
  ! - +             Prefix
  * /               Product
  + -               Sum
  < <= > >= == !=   Comparison
  ||                Or
  &&                And
  ??                Null coalesce
  [ ]               Index
  ? :               Ternary
  =                 Assignment

  Binary operators are left-associative; assignment nests to the right.

  Examples:
    1 + 2 * 3       7
    (1 + 2) * 3     9
    2 - 3 - 4       -5

COMPARISON AND LOGIC
  Results are 1 (true) or 0 (false). && and || short-circuit.
  A value is true when it is a number greater than 0.

TERNARY
  cond ? then : else
    Takes the then-branch only when cond is exactly 1.

    Examples:
      1 ? 10 : 20   10
      2 ? 10 : 20   20

  cond ? then       then when cond is exactly 1, otherwise 0
  cond ?: else      else when cond is not exactly 1, otherwise cond

NULL COALESCE
  a ?? b
    a unless a is 0, in which case b.

    Examples:
      0 ?? 5        5
      3 ?? 5        3
"#;

const ROOTS_DOC: &str = r#"ROOTS - Where Paths Resolve

  variable (v)      Persistent store. Survives between evaluations.
  temp (t)          Scratch store. Cleared after every evaluation.
  array             Store whose members are auto-created as arrays.
  context (c)       Read-only values supplied by the caller.
  math              Function library, see 'molang doc math'.
  query (q)         Host values. Only present when the host registers it.

READING
  A missing member of variable, temp, or context reads as 0.
  An unknown root is an error.

WRITING
  Assigning to a path creates intermediate stores as needed:
    v.pos.x = 1;    creates v.pos, then sets x

  Writing to context or math is an error.

CLI
  molang eval 'c.speed * 2' --context '{"speed": 3}'
  echo '{"speed": 3}' | molang eval 'c.speed * 2'
"#;

const MATH_DOC: &str = r#"MATH - The math.* Library

Angles are in degrees, both in and out.

BASIC
  math.abs(x)               Absolute value
  math.ceil(x)              Round up
  math.floor(x)             Round down
  math.round(x)             Round to nearest, halves away from zero
  math.trunc(x)             Round toward zero
  math.clamp(x, lo, hi)     x limited to lo..hi
  math.max(a, b)            Larger of a and b
  math.min(a, b)            Smaller of a and b
  math.mod(a, b)            Remainder of a / b
  math.pi                   3.14159...

POWERS
  math.exp(x)               e^x
  math.ln(x)                Natural logarithm
  math.pow(a, b)            a^b
  math.sqrt(x)              Square root

TRIGONOMETRY
  math.sin(deg)  math.cos(deg)
  math.asin(x)   math.acos(x)   math.atan(x)   math.atan2(y, x)

INTERPOLATION
  math.lerp(a, b, t)        a + (b - a) * t, t clamped to 0..1
  math.lerp_rotate(a, b, t) Like lerp along the shortest angle
  math.hermite_blend(t)     3t^2 - 2t^3
  math.min_angle(deg)       Angle normalized to -180..180

RANDOM (never constant-folded)
  math.random(lo, hi)               Uniform float
  math.random_integer(lo, hi)       Uniform integer in lo..hi, hi excluded
  math.die_roll(n, lo, hi)          Sum of n float rolls
  math.die_roll_integer(n, lo, hi)  Sum of n integer rolls

  Examples:
    math.clamp(15, 0, 10)     10
    math.lerp(0, 10, 0.5)     5
"#;

const CONTROL_DOC: &str = r#"CONTROL - Loops and Flow

LOOP
  loop(count, { body });
    Runs body count times (count is truncated to an integer).

    Example:
      Formula: t.x = 0; loop(3, { t.x = t.x + 1; }); return t.x;
      Output:  3

FOR_EACH
  for_each(t.item, v.list, { body });
    Binds each element of v.list to t.item and runs body.
    Stores iterate their values in key order.

BREAK AND CONTINUE
  break;            Leave the innermost loop
  continue;         Skip to the next iteration

RETURN
  return expr;      End the formula with expr as its value
                    (also from inside a loop body)
"#;

const TYPES_DOC: &str = r#"TYPES - Values and Coercion

  Number        64-bit float. Booleans are 1 and 0.
  String        Text. Compares with == and != only.
  Struct        A store, array, or host object. Holds members.

COERCION
  Arithmetic on a non-number treats it as 0.
  A value is true when it is a number greater than 0.

EQUALITY
  Values of different types are never equal.
  Structs are equal only when they are the same store.

OUTPUT
  The CLI prints results as JSON. Whole numbers print without a
  fraction, stores print as objects, and arrays print as arrays.
"#;
