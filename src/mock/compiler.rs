// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Signature-level front end for OpenCL C and SPIR-V.
//!
//! The mock runtime never executes device code, so compiling only has to
//! recover what the host can observe: which kernels a program defines and the
//! shape of their parameters. Bodies are checked for balanced delimiters and
//! skipped. `#error` fails the build, which gives tests a direct way to produce
//! a build log.
//!
//! Diagnostics use the `line:col: error: message` form of clang-based
//! compilers.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Parameter of a compiled kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Param {
    pub type_name: String,
    pub kind: ParamKind,
}

/// Address space (for pointers) or byte size (for values) of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    Global,
    Constant,
    Local,
    Value(usize),
}

impl Param {
    /// Byte size `clSetKernelArg` must be called with, `None` for `__local`.
    pub fn arg_size(&self) -> Option<usize> {
        match self.kind {
            ParamKind::Global | ParamKind::Constant => Some(std::mem::size_of::<usize>()),
            ParamKind::Local => None,
            ParamKind::Value(size) => Some(size),
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self.kind, ParamKind::Global | ParamKind::Constant)
    }
}

/// One kernel entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KernelDecl {
    pub name: String,
    pub params: Vec<Param>,
}

/// SPIR-V magic number, first word of every module.
pub(crate) const SPIRV_MAGIC: u32 = 0x0723_0203;

const SPIRV_HEADER_WORDS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Pos {
    line: usize,
    col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Punct(char),
    Other,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    pos: Pos,
}

impl Token {
    fn is_ident(&self, name: &str) -> bool {
        matches!(&self.tok, Tok::Ident(s) if s == name)
    }

    fn is_punct(&self, c: char) -> bool {
        self.tok == Tok::Punct(c)
    }
}

#[derive(Default)]
struct Diagnostics {
    errors: Vec<String>,
}

impl Diagnostics {
    fn error(&mut self, pos: Pos, message: impl std::fmt::Display) {
        self.errors.push(format!("{}:{}: error: {message}", pos.line, pos.col));
    }

    fn check(&self) -> Result<(), String> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let mut log = self.errors.join("\n");
        let count = self.errors.len();
        let _ = write!(
            log,
            "\n{count} error{} generated.",
            if count == 1 { "" } else { "s" }
        );
        Err(log)
    }
}

/// Compile OpenCL C source down to its kernel signatures.
///
/// Returns the build log on failure.
pub(crate) fn compile_source(source: &str) -> Result<Vec<KernelDecl>, String> {
    let mut diags = Diagnostics::default();
    let text = strip_comments(source);
    let text = preprocess(&text, &mut diags);
    check_delimiters(&text, &mut diags);
    diags.check()?;

    let tokens = tokenize(&text);
    let kernels = find_kernels(&tokens, &mut diags);
    diags.check()?;
    Ok(kernels)
}

/// Replace comments with spaces, keeping newlines so positions stay valid.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(' ');
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    out.push(if next == '\n' { '\n' } else { ' ' });
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Handle directives: `#error` is reported, every directive line is blanked.
fn preprocess(text: &str, diags: &mut Diagnostics) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.strip_prefix('#') {
            let col = line.len() - trimmed.len() + 1;
            let directive = directive.trim_start();
            if let Some(message) = directive.strip_prefix("error") {
                diags.error(
                    Pos {
                        line: index + 1,
                        col,
                    },
                    format_args!("#error{message}"),
                );
            }
            out.extend(std::iter::repeat(' ').take(line.chars().count()));
        } else {
            out.push_str(line);
        }
    }
    out
}

fn check_delimiters(text: &str, diags: &mut Diagnostics) {
    let mut stack: Vec<(char, Pos)> = Vec::new();
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut pos = Pos { line: 1, col: 0 };

    for c in text.chars() {
        if c == '\n' {
            pos.line += 1;
            pos.col = 0;
            continue;
        }
        pos.col += 1;

        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => in_string = Some(c),
            '(' | '[' | '{' => stack.push((c, pos)),
            ')' | ']' | '}' => match stack.pop() {
                Some((open, _)) if closing(open) == c => {}
                Some((open, open_pos)) => {
                    diags.error(
                        pos,
                        format_args!(
                            "expected '{}' to match '{open}' at {}:{}",
                            closing(open),
                            open_pos.line,
                            open_pos.col
                        ),
                    );
                    return;
                }
                None => {
                    diags.error(pos, format_args!("extraneous closing '{c}'"));
                    return;
                }
            },
            _ => {}
        }
    }

    if let Some((open, open_pos)) = stack.pop() {
        let end = Pos {
            line: pos.line,
            col: pos.col + 1,
        };
        diags.error(
            end,
            format_args!(
                "expected '{}' to match '{open}' at {}:{}",
                closing(open),
                open_pos.line,
                open_pos.col
            ),
        );
    }
}

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut pos = Pos { line: 1, col: 0 };

    while let Some(c) = chars.next() {
        if c == '\n' {
            pos.line += 1;
            pos.col = 0;
            continue;
        }
        pos.col += 1;
        if c.is_whitespace() {
            continue;
        }

        let start = pos;
        if c.is_ascii_alphabetic() || c == '_' {
            let mut ident = String::from(c);
            while let Some(&next) = chars.peek() {
                if !(next.is_ascii_alphanumeric() || next == '_') {
                    break;
                }
                ident.push(next);
                pos.col += 1;
                chars.next();
            }
            tokens.push(Token {
                tok: Tok::Ident(ident),
                pos: start,
            });
        } else if c.is_ascii_digit() {
            while let Some(&next) = chars.peek() {
                if !(next.is_ascii_alphanumeric() || next == '.') {
                    break;
                }
                pos.col += 1;
                chars.next();
            }
            tokens.push(Token {
                tok: Tok::Other,
                pos: start,
            });
        } else if c == '"' || c == '\'' {
            let mut escaped = false;
            for next in chars.by_ref() {
                pos.col += 1;
                if escaped {
                    escaped = false;
                } else if next == '\\' {
                    escaped = true;
                } else if next == c {
                    break;
                }
            }
            tokens.push(Token {
                tok: Tok::Other,
                pos: start,
            });
        } else {
            tokens.push(Token {
                tok: Tok::Punct(c),
                pos: start,
            });
        }
    }
    tokens
}

fn find_kernels(tokens: &[Token], diags: &mut Diagnostics) -> Vec<KernelDecl> {
    let mut kernels = Vec::new();
    let mut seen = HashSet::new();
    let mut i = 0;

    while i < tokens.len() {
        if !(tokens[i].is_ident("__kernel") || tokens[i].is_ident("kernel")) {
            i += 1;
            continue;
        }
        let kernel_pos = tokens[i].pos;
        i = skip_attributes(tokens, i + 1);

        match tokens.get(i) {
            Some(t) if t.is_ident("void") => i += 1,
            Some(t) => {
                diags.error(t.pos, "kernel functions must have void return type");
                return kernels;
            }
            None => {
                diags.error(kernel_pos, "expected function declaration after '__kernel'");
                return kernels;
            }
        }

        let name = match tokens.get(i).map(|t| &t.tok) {
            Some(Tok::Ident(name)) => name.clone(),
            _ => {
                diags.error(kernel_pos, "expected kernel name");
                return kernels;
            }
        };
        let name_pos = tokens[i].pos;
        i += 1;

        if !tokens.get(i).is_some_and(|t| t.is_punct('(')) {
            diags.error(name_pos, format_args!("expected '(' after '{name}'"));
            return kernels;
        }
        let close = matching(tokens, i);
        let params = match parse_params(&tokens[i + 1..close], diags) {
            Some(params) => params,
            None => return kernels,
        };
        i = close + 1;

        // A prototype without a body does not define the kernel.
        if tokens.get(i).is_some_and(|t| t.is_punct(';')) {
            i += 1;
            continue;
        }
        if !tokens.get(i).is_some_and(|t| t.is_punct('{')) {
            diags.error(name_pos, format_args!("expected function body for '{name}'"));
            return kernels;
        }
        i = matching(tokens, i) + 1;

        if !seen.insert(name.clone()) {
            diags.error(name_pos, format_args!("redefinition of '{name}'"));
            continue;
        }
        kernels.push(KernelDecl { name, params });
    }
    kernels
}

fn skip_attributes(tokens: &[Token], mut i: usize) -> usize {
    while tokens.get(i).is_some_and(|t| t.is_ident("__attribute__")) {
        i += 1;
        if tokens.get(i).is_some_and(|t| t.is_punct('(')) {
            i = matching(tokens, i) + 1;
        }
    }
    i
}

/// Index of the delimiter closing the one at `open`. Delimiters are known
/// to be balanced at this point.
fn matching(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token.tok {
            Tok::Punct('(' | '[' | '{') => depth += 1,
            Tok::Punct(')' | ']' | '}') => {
                depth -= 1;
                if depth == 0 {
                    return open + offset;
                }
            }
            _ => {}
        }
    }
    tokens.len().saturating_sub(1)
}

const QUALIFIERS: &[&str] = &[
    "const",
    "volatile",
    "restrict",
    "__restrict",
    "__private",
    "private",
    "__read_only",
    "read_only",
    "__write_only",
    "write_only",
    "signed",
];

fn parse_params(tokens: &[Token], diags: &mut Diagnostics) -> Option<Vec<Param>> {
    if tokens.is_empty() || (tokens.len() == 1 && tokens[0].is_ident("void")) {
        return Some(Vec::new());
    }
    let mut params = Vec::new();
    for group in tokens.split(|t| t.is_punct(',')) {
        let Some(first) = group.first() else {
            diags.error(Pos { line: 0, col: 0 }, "expected parameter declarator");
            return None;
        };
        params.push(parse_param(group, first.pos, diags)?);
    }
    Some(params)
}

fn parse_param(group: &[Token], pos: Pos, diags: &mut Diagnostics) -> Option<Param> {
    let mut space: Option<ParamKind> = None;
    let mut unsigned = false;
    let mut pointer = false;
    let mut words: Vec<&str> = Vec::new();

    for token in group {
        match &token.tok {
            Tok::Punct('*') => pointer = true,
            Tok::Ident(word) => match word.as_str() {
                "__global" | "global" => space = Some(ParamKind::Global),
                "__constant" | "constant" => space = Some(ParamKind::Constant),
                "__local" | "local" => space = Some(ParamKind::Local),
                "unsigned" => unsigned = true,
                w if QUALIFIERS.contains(&w) => {}
                w => words.push(w),
            },
            _ => {}
        }
    }

    // `unsigned n` declares an unsigned int named n
    let type_name = match (words.first(), unsigned) {
        (Some(_), true) if words.len() == 1 => "uint".to_string(),
        (Some(t), true) => format!("u{t}"),
        (Some(t), false) => (*t).to_string(),
        (None, true) => "uint".to_string(),
        (None, false) => {
            diags.error(pos, "expected parameter type");
            return None;
        }
    };

    if pointer {
        let Some(kind) = space else {
            diags.error(
                pos,
                "pointer arguments to kernel functions must be in __global, __constant, or __local address space",
            );
            return None;
        };
        return Some(Param {
            type_name: format!("{type_name}*"),
            kind,
        });
    }
    if space.is_some() {
        diags.error(pos, "non-pointer kernel argument cannot have an address space qualifier");
        return None;
    }
    let Some(size) = value_size(&type_name) else {
        diags.error(pos, format_args!("unknown type name '{type_name}'"));
        return None;
    };
    Some(Param {
        type_name,
        kind: ParamKind::Value(size),
    })
}

/// Byte size of an OpenCL C value type, including vector types.
fn value_size(type_name: &str) -> Option<usize> {
    let scalar = |name: &str| -> Option<usize> {
        Some(match name {
            "char" | "uchar" | "bool" => 1,
            "short" | "ushort" | "half" => 2,
            "int" | "uint" | "float" => 4,
            "long" | "ulong" | "double" => 8,
            "size_t" | "ptrdiff_t" | "intptr_t" | "uintptr_t" => std::mem::size_of::<usize>(),
            _ => return None,
        })
    };
    if let Some(size) = scalar(type_name) {
        return Some(size);
    }
    let split = type_name.find(|c: char| c.is_ascii_digit())?;
    let (base, lanes) = type_name.split_at(split);
    let lanes = match lanes {
        "2" => 2,
        // three-component vectors are padded to four
        "3" | "4" => 4,
        "8" => 8,
        "16" => 16,
        _ => return None,
    };
    if base == "bool" || base == "size_t" {
        return None;
    }
    scalar(base).map(|size| size * lanes)
}

/// Whether `il` is shaped like a SPIR-V module at all.
pub(crate) fn looks_like_spirv(il: &[u8]) -> bool {
    il.len() >= SPIRV_HEADER_WORDS * 4
        && il.len() % 4 == 0
        && u32::from_le_bytes([il[0], il[1], il[2], il[3]]) == SPIRV_MAGIC
}

const OP_ENTRY_POINT: u32 = 15;
const OP_TYPE_INT: u32 = 21;
const OP_TYPE_FLOAT: u32 = 22;
const OP_TYPE_VECTOR: u32 = 23;
const OP_TYPE_POINTER: u32 = 32;
const OP_FUNCTION: u32 = 54;
const OP_FUNCTION_PARAMETER: u32 = 55;
const EXECUTION_MODEL_KERNEL: u32 = 6;

#[derive(Debug, Clone, Copy)]
enum SpirvType {
    Int(u32),
    Float(u32),
    Vector(u32, u32),
    Pointer(u32),
}

/// Read kernel entry points and their parameters from a SPIR-V module.
///
/// Returns the build log on malformed input.
pub(crate) fn compile_il(il: &[u8]) -> Result<Vec<KernelDecl>, String> {
    if !looks_like_spirv(il) {
        return Err("0:0: error: invalid SPIR-V module header\n1 error generated.".to_string());
    }
    let words: Vec<u32> = il
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();

    let mut entries: Vec<(u32, String)> = Vec::new();
    let mut types: HashMap<u32, SpirvType> = HashMap::new();
    let mut functions: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut current: Option<u32> = None;

    let mut at = SPIRV_HEADER_WORDS;
    while at < words.len() {
        let opcode = words[at] & 0xFFFF;
        let count = (words[at] >> 16) as usize;
        if count == 0 || at + count > words.len() {
            return Err(format!(
                "0:{at}: error: malformed SPIR-V instruction\n1 error generated."
            ));
        }
        let operands = &words[at + 1..at + count];
        match opcode {
            OP_ENTRY_POINT if operands.len() >= 3 && operands[0] == EXECUTION_MODEL_KERNEL => {
                entries.push((operands[1], literal_string(&operands[2..])));
            }
            OP_TYPE_INT if operands.len() >= 2 => {
                types.insert(operands[0], SpirvType::Int(operands[1]));
            }
            OP_TYPE_FLOAT if operands.len() >= 2 => {
                types.insert(operands[0], SpirvType::Float(operands[1]));
            }
            OP_TYPE_VECTOR if operands.len() >= 3 => {
                types.insert(operands[0], SpirvType::Vector(operands[1], operands[2]));
            }
            OP_TYPE_POINTER if operands.len() >= 2 => {
                types.insert(operands[0], SpirvType::Pointer(operands[1]));
            }
            OP_FUNCTION if operands.len() >= 2 => {
                current = Some(operands[1]);
                functions.insert(operands[1], Vec::new());
            }
            OP_FUNCTION_PARAMETER if !operands.is_empty() => {
                if let Some(params) = current.and_then(|f| functions.get_mut(&f)) {
                    params.push(operands[0]);
                }
            }
            _ => {}
        }
        at += count;
    }

    let mut kernels = Vec::with_capacity(entries.len());
    for (function, name) in entries {
        let params = functions
            .get(&function)
            .map(|ids| ids.iter().map(|id| spirv_param(*id, &types)).collect())
            .unwrap_or_default();
        kernels.push(KernelDecl { name, params });
    }
    Ok(kernels)
}

fn spirv_param(type_id: u32, types: &HashMap<u32, SpirvType>) -> Param {
    let byte_size = |id: u32| -> usize {
        match types.get(&id) {
            Some(SpirvType::Int(bits) | SpirvType::Float(bits)) => (*bits as usize) / 8,
            Some(SpirvType::Vector(component, lanes)) => {
                let lanes = if *lanes == 3 { 4 } else { *lanes as usize };
                match types.get(component) {
                    Some(SpirvType::Int(bits) | SpirvType::Float(bits)) => (*bits as usize) / 8 * lanes,
                    _ => 0,
                }
            }
            _ => 0,
        }
    };
    match types.get(&type_id) {
        // storage classes: 0 UniformConstant, 4 Workgroup, 5 CrossWorkgroup
        Some(SpirvType::Pointer(0)) => Param {
            type_name: "constant*".to_string(),
            kind: ParamKind::Constant,
        },
        Some(SpirvType::Pointer(4)) => Param {
            type_name: "local*".to_string(),
            kind: ParamKind::Local,
        },
        Some(SpirvType::Pointer(_)) => Param {
            type_name: "global*".to_string(),
            kind: ParamKind::Global,
        },
        _ => Param {
            type_name: format!("%{type_id}"),
            kind: ParamKind::Value(byte_size(type_id)),
        },
    }
}

fn literal_string(words: &[u32]) -> String {
    let bytes: Vec<u8> = words
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Assemble a module with one kernel `name(global float*, int)`.
    pub(crate) fn tiny_module(name: &str) -> Vec<u8> {
        let mut words = vec![SPIRV_MAGIC, 0x0001_0000, 0, 20, 0];
        let mut name_words: Vec<u32> = name
            .as_bytes()
            .chunks(4)
            .map(|c| {
                let mut w = [0u8; 4];
                w[..c.len()].copy_from_slice(c);
                u32::from_le_bytes(w)
            })
            .collect();
        if name.len() % 4 == 0 {
            name_words.push(0);
        }
        let mut inst = |opcode: u32, operands: &[u32]| {
            words.push(((operands.len() as u32 + 1) << 16) | opcode);
            words.extend_from_slice(operands);
        };
        let mut entry = vec![EXECUTION_MODEL_KERNEL, 10];
        entry.extend(&name_words);
        inst(OP_ENTRY_POINT, &entry);
        inst(OP_TYPE_FLOAT, &[2, 32]);
        inst(OP_TYPE_INT, &[3, 32, 0]);
        inst(OP_TYPE_POINTER, &[4, 5, 2]);
        inst(OP_FUNCTION, &[1, 10, 0, 9]);
        inst(OP_FUNCTION_PARAMETER, &[4, 11]);
        inst(OP_FUNCTION_PARAMETER, &[3, 12]);
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_kernel_signatures() {
        let kernels = compile_source(
            "// copy kernel\n\
             __kernel void copy(__global const float* src, __global float* dst) {\n\
                 dst[get_global_id(0)] = src[get_global_id(0)];\n\
             }\n\
             kernel void scale(global float4 *v, float k, __local int* tmp, unsigned n) { }\n",
        )
        .unwrap();
        assert_eq!(kernels.len(), 2);
        assert_eq!(kernels[0].name, "copy");
        assert_eq!(kernels[0].params.len(), 2);
        assert!(kernels[0].params.iter().all(Param::is_memory));

        let scale = &kernels[1].params;
        assert_eq!(scale[0].kind, ParamKind::Global);
        assert_eq!(scale[1].kind, ParamKind::Value(4));
        assert_eq!(scale[2].kind, ParamKind::Local);
        assert_eq!(scale[2].arg_size(), None);
        assert_eq!(scale[3].type_name, "uint");
    }

    #[test]
    fn test_missing_brace_is_reported() {
        let log = compile_source("__kernel void f(__global int* x) { x[0] = 1; ").unwrap_err();
        assert!(log.contains("1:"), "{log}");
        assert!(log.contains("error: expected '}'"), "{log}");
        assert!(log.ends_with("1 error generated."));
    }

    #[test]
    fn test_error_directive() {
        let log = compile_source("  #error unsupported target\n__kernel void f() {}").unwrap_err();
        assert!(log.starts_with("1:3: error: #error unsupported target"), "{log}");
    }

    #[test]
    fn test_comments_and_strings_ignored() {
        let kernels = compile_source(
            "/* __kernel void hidden() { */\n\
             __kernel void shown(int a) { printf(\"}\"); }",
        )
        .unwrap();
        assert_eq!(kernels.len(), 1);
        assert_eq!(kernels[0].name, "shown");
    }

    #[test]
    fn test_bad_signatures() {
        assert!(compile_source("__kernel int f() {}").is_err());
        assert!(compile_source("__kernel void f(float* p) {}").is_err());
        assert!(compile_source("__kernel void f(matrix m) {}").is_err());
        assert!(compile_source("__kernel void f() {} __kernel void f() {}").is_err());
    }

    #[test]
    fn test_vector_sizes() {
        assert_eq!(value_size("float3"), Some(16));
        assert_eq!(value_size("uchar16"), Some(16));
        assert_eq!(value_size("double2"), Some(16));
        assert_eq!(value_size("float5"), None);
    }

    #[test]
    fn test_spirv_entry_points() {
        let module = tiny_module("axpy");
        assert!(looks_like_spirv(&module));
        let kernels = compile_il(&module).unwrap();
        assert_eq!(kernels.len(), 1);
        assert_eq!(kernels[0].name, "axpy");
        assert_eq!(kernels[0].params[0].kind, ParamKind::Global);
        assert_eq!(kernels[0].params[1].kind, ParamKind::Value(4));
    }

    #[test]
    fn test_not_spirv() {
        assert!(!looks_like_spirv(b"not a module at all!"));
        assert!(compile_il(&[0u8; 3]).is_err());
    }
}
