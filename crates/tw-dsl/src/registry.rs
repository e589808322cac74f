//! The trigger registry: names that may appear in a script, and how their
//! arguments bind.
//!
//! A trigger call is written either as a bare name (`always`) or as a
//! single-key mapping whose value holds the arguments:
//!
//! ```yaml
//! - inc: visits                          # one positional argument
//! - set_key: [door, open]                # positional arguments
//! - on_key: { key: door, value: open }   # named arguments
//! ```
//!
//! Names are matched case-insensitively.

use std::collections::HashMap;
use std::fmt;

use serde_yaml::Value as Yaml;
use tw_core::Value;
use tw_engine::{Operand, Relation, Trigger};

use crate::error::{CompileError, CompileResult};

type Build = fn(&Bound<'_>) -> CompileResult<Trigger>;

/// A registered trigger constructor.
pub struct TriggerDef {
    /// Primary name, used in error messages.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
    /// Parameter slots in positional order. Each slot lists the names it
    /// answers to when arguments are given by name.
    pub params: &'static [&'static [&'static str]],
    /// Takes any number of trigger calls instead of fixed parameters.
    pub variadic: bool,
    build: Build,
}

impl fmt::Debug for TriggerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerDef")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .finish_non_exhaustive()
    }
}

static BUILTINS: &[TriggerDef] = &[
    TriggerDef {
        name: "set_key",
        aliases: &[],
        params: &[&["key"], &["value"]],
        variadic: false,
        build: build_set_key,
    },
    TriggerDef {
        name: "inc",
        aliases: &[],
        params: &[&["key"]],
        variadic: false,
        build: build_inc,
    },
    TriggerDef {
        name: "dec",
        aliases: &[],
        params: &[&["key"]],
        variadic: false,
        build: build_dec,
    },
    TriggerDef {
        name: "on_match",
        aliases: &[],
        params: &[&["pattern", "matcher"], &["keys"]],
        variadic: false,
        build: build_on_match,
    },
    TriggerDef {
        name: "on_key",
        aliases: &["eq"],
        params: &[&["key"], &["value"], &["other"]],
        variadic: false,
        build: build_on_key,
    },
    TriggerDef {
        name: "on_key_gt",
        aliases: &["on_gt", "gt"],
        params: &[&["key"], &["value"], &["other"]],
        variadic: false,
        build: build_gt,
    },
    TriggerDef {
        name: "on_key_lt",
        aliases: &["on_lt", "lt"],
        params: &[&["key"], &["value"], &["other"]],
        variadic: false,
        build: build_lt,
    },
    TriggerDef {
        name: "on_key_gte",
        aliases: &["on_gte", "gte"],
        params: &[&["key"], &["value"], &["other"]],
        variadic: false,
        build: build_gte,
    },
    TriggerDef {
        name: "on_key_lte",
        aliases: &["on_lte", "lte"],
        params: &[&["key"], &["value"], &["other"]],
        variadic: false,
        build: build_lte,
    },
    TriggerDef {
        name: "on_tag",
        aliases: &["tag"],
        params: &[&["tag"]],
        variadic: false,
        build: build_on_tag,
    },
    TriggerDef {
        name: "always",
        aliases: &[],
        params: &[],
        variadic: false,
        build: build_always,
    },
    TriggerDef {
        name: "on_all",
        aliases: &[],
        params: &[],
        variadic: true,
        build: build_on_all,
    },
    TriggerDef {
        name: "on_any",
        aliases: &[],
        params: &[],
        variadic: true,
        build: build_on_any,
    },
    TriggerDef {
        name: "do_enter_revert",
        aliases: &["revert"],
        params: &[],
        variadic: false,
        build: build_revert,
    },
    TriggerDef {
        name: "reject",
        aliases: &[],
        params: &[&["message"]],
        variadic: false,
        build: build_reject,
    },
    TriggerDef {
        name: "banner",
        aliases: &[],
        params: &[&["value", "text"]],
        variadic: false,
        build: build_banner,
    },
];

/// Name → constructor table used by the compiler.
#[derive(Debug, Clone)]
pub struct Registry {
    by_name: HashMap<String, &'static TriggerDef>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// A registry holding every built-in trigger under all its names.
    pub fn builtin() -> Self {
        let mut by_name = HashMap::new();
        for def in BUILTINS {
            by_name.insert(def.name.to_string(), def);
            for alias in def.aliases {
                by_name.insert(alias.to_string(), def);
            }
        }
        Self { by_name }
    }

    /// Look up a trigger by any of its names, ignoring case.
    pub fn get(&self, name: &str) -> Option<&'static TriggerDef> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Compile a trigger section: a single call, or a list of calls
    /// combined with `on_all`.
    pub fn compile_section(&self, section: &Yaml, at: &str) -> CompileResult<Trigger> {
        match section {
            Yaml::Sequence(items) => {
                let clauses = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.compile_call(item, &format!("{at}[{i}]")))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Trigger::All(clauses))
            }
            other => self.compile_call(other, at),
        }
    }

    /// Compile one trigger call.
    pub fn compile_call(&self, call: &Yaml, at: &str) -> CompileResult<Trigger> {
        let (name, args) = split_call(call, at)?;
        let def = self.get(name).ok_or_else(|| CompileError::UnknownTrigger {
            name: name.to_string(),
            at: at.to_string(),
        })?;
        let bound = Bound::bind(def, args, self, at)?;
        (def.build)(&bound)
    }
}

fn malformed(reason: impl Into<String>, at: &str) -> CompileError {
    CompileError::MalformedCall {
        reason: reason.into(),
        at: at.to_string(),
    }
}

fn split_call<'a>(call: &'a Yaml, at: &str) -> CompileResult<(&'a str, Option<&'a Yaml>)> {
    match call {
        Yaml::String(name) => Ok((name, None)),
        Yaml::Mapping(map) => {
            if map.len() != 1 {
                return Err(malformed(
                    format!("expected a single trigger name, found {} keys", map.len()),
                    at,
                ));
            }
            let Some((key, args)) = map.iter().next() else {
                return Err(malformed("empty mapping", at));
            };
            let Yaml::String(name) = key else {
                return Err(malformed("trigger name must be a string", at));
            };
            match args {
                Yaml::Null => Ok((name, None)),
                args => Ok((name, Some(args))),
            }
        }
        _ => Err(malformed("expected a name or a single-key mapping", at)),
    }
}

/// Render a YAML scalar as text. Collections have no text form.
pub(crate) fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Null => Some(String::new()),
        _ => None,
    }
}

/// Convert a YAML scalar into a bag value. Integers stay integers; every
/// other scalar is stored as its text rendering.
pub(crate) fn scalar_value(value: &Yaml) -> Option<Value> {
    match value {
        Yaml::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Text(n.to_string()),
        }),
        other => scalar_text(other).map(Value::Text),
    }
}

/// Arguments of one call, bound to a definition's parameter slots.
struct Bound<'a> {
    def: &'static TriggerDef,
    slots: Vec<Option<&'a Yaml>>,
    rest: Vec<&'a Yaml>,
    registry: &'a Registry,
    at: &'a str,
}

impl<'a> Bound<'a> {
    fn bind(
        def: &'static TriggerDef,
        args: Option<&'a Yaml>,
        registry: &'a Registry,
        at: &'a str,
    ) -> CompileResult<Self> {
        let mut bound = Self {
            def,
            slots: vec![None; def.params.len()],
            rest: Vec::new(),
            registry,
            at,
        };
        let Some(args) = args else {
            return Ok(bound);
        };

        if def.variadic {
            match args {
                Yaml::Sequence(items) => bound.rest.extend(items),
                // a lone call
                other => bound.rest.push(other),
            }
            return Ok(bound);
        }

        match args {
            Yaml::Sequence(items) => {
                if items.len() > def.params.len() {
                    return Err(bound.bad(format!(
                        "takes at most {} argument(s), got {}",
                        def.params.len(),
                        items.len()
                    )));
                }
                for (slot, item) in bound.slots.iter_mut().zip(items) {
                    *slot = Some(item);
                }
            }
            Yaml::Mapping(map) => {
                for (key, value) in map {
                    let Some(key) = key.as_str() else {
                        return Err(bound.bad("argument names must be strings"));
                    };
                    let Some(idx) = def.params.iter().position(|names| names.contains(&key))
                    else {
                        return Err(bound.bad(format!("has no parameter `{key}`")));
                    };
                    if bound.slots[idx].is_some() {
                        return Err(bound.bad(format!("parameter `{key}` given twice")));
                    }
                    bound.slots[idx] = Some(value);
                }
            }
            scalar => {
                if def.params.is_empty() {
                    return Err(bound.bad("takes no arguments"));
                }
                bound.slots[0] = Some(scalar);
            }
        }
        Ok(bound)
    }

    fn bad(&self, reason: impl Into<String>) -> CompileError {
        CompileError::BadArgument {
            trigger: self.def.name.to_string(),
            reason: reason.into(),
            at: self.at.to_string(),
        }
    }

    fn param_name(&self, idx: usize) -> &'static str {
        self.def.params[idx][0]
    }

    fn required(&self, idx: usize) -> CompileResult<&'a Yaml> {
        self.slots[idx]
            .ok_or_else(|| self.bad(format!("requires `{}`", self.param_name(idx))))
    }

    fn required_text(&self, idx: usize) -> CompileResult<String> {
        scalar_text(self.required(idx)?)
            .ok_or_else(|| self.bad(format!("`{}` must be a scalar", self.param_name(idx))))
    }

    fn required_value(&self, idx: usize) -> CompileResult<Value> {
        scalar_value(self.required(idx)?)
            .ok_or_else(|| self.bad(format!("`{}` must be a scalar", self.param_name(idx))))
    }

    fn optional_value(&self, idx: usize) -> CompileResult<Option<Value>> {
        match self.slots[idx] {
            None => Ok(None),
            Some(_) => self.required_value(idx).map(Some),
        }
    }

    fn clauses(&self) -> CompileResult<Vec<Trigger>> {
        self.rest
            .iter()
            .enumerate()
            .map(|(i, call)| {
                let at = format!("{}.{}[{i}]", self.at, self.def.name);
                self.registry.compile_call(call, &at)
            })
            .collect()
    }

    // `value` and `other` are mutually exclusive; exactly one is required.
    fn operand(&self) -> CompileResult<Operand> {
        let value = self.optional_value(1)?;
        let other = match self.slots[2] {
            None => None,
            Some(_) => Some(self.required_text(2)?),
        };
        match (value, other) {
            (Some(value), None) => Ok(Operand::Value(value)),
            (None, Some(other)) => Ok(Operand::Key(other)),
            _ => Err(self.bad("takes exactly one of `value` or `other`")),
        }
    }

    fn compare(&self, relation: Relation) -> CompileResult<Trigger> {
        Ok(Trigger::Compare {
            key: self.required_text(0)?,
            relation,
            operand: self.operand()?,
        })
    }
}

fn build_set_key(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::SetKey {
        key: b.required_text(0)?,
        value: b.required_value(1)?,
    })
}

fn build_inc(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::Inc {
        key: b.required_text(0)?,
    })
}

fn build_dec(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::Dec {
        key: b.required_text(0)?,
    })
}

fn build_on_match(b: &Bound<'_>) -> CompileResult<Trigger> {
    let pattern = b.required_text(0)?;
    let keys = match b.slots[1] {
        None => Vec::new(),
        Some(Yaml::Sequence(items)) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| b.bad("`keys` must be a list of names")))
            .collect::<CompileResult<Vec<_>>>()?,
        Some(single) => {
            vec![scalar_text(single).ok_or_else(|| b.bad("`keys` must be a list of names"))?]
        }
    };
    Trigger::on_match(&pattern, keys).map_err(|e| CompileError::InvalidRegex {
        pattern,
        reason: e.to_string(),
        at: b.at.to_string(),
    })
}

fn build_on_key(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::OnKey {
        key: b.required_text(0)?,
        operand: b.operand()?,
    })
}

fn build_gt(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.compare(Relation::Gt)
}

fn build_lt(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.compare(Relation::Lt)
}

fn build_gte(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.compare(Relation::Gte)
}

fn build_lte(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.compare(Relation::Lte)
}

fn build_on_tag(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::OnTag {
        tag: b.required_text(0)?,
    })
}

fn build_always(_: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::Always)
}

fn build_on_all(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.clauses().map(Trigger::All)
}

fn build_on_any(b: &Bound<'_>) -> CompileResult<Trigger> {
    b.clauses().map(Trigger::Any)
}

fn build_revert(_: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::EnterRevert)
}

fn build_reject(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::Reject {
        message: b.required_text(0)?,
    })
}

fn build_banner(b: &Bound<'_>) -> CompileResult<Trigger> {
    Ok(Trigger::Banner {
        value: b.required_text(0)?,
    })
}
