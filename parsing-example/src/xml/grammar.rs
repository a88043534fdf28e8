use super::processor::{XmlProcessor, XmlValue};
use parsing_framework::{forward, ActionContext, GrammarBuilder, Parser, RuleBuilder};
use std::rc::Rc;

pub const NAME: &str = "XmlGrammar";

/// Calls `rule`, passing the caller's processor along.
fn call(rule: &str) -> Parser<XmlValue> {
    Parser::call(rule, rule, vec![forward("processor")])
}

/// Runs `f` against the processor inherited by the current rule.
fn emit(ctx: &mut ActionContext<'_, XmlValue>, f: impl FnOnce(&mut dyn XmlProcessor)) {
    let processor = match ctx.frame().inherited("processor") {
        Some(XmlValue::Processor(processor)) => Some(Rc::clone(processor)),
        _ => None,
    };
    let Some(processor) = processor else {
        return ctx.raise("no xml processor in scope");
    };
    let borrowed = processor.try_borrow_mut();
    match borrowed {
        Ok(mut processor) => f(&mut *processor),
        Err(_) => ctx.raise("xml processor is already in use"),
    };
}

fn take_text(ctx: &mut ActionContext<'_, XmlValue>, instance: &str) -> Option<String> {
    ctx.take_instance(instance).and_then(XmlValue::into_text)
}

fn append_value(ctx: &mut ActionContext<'_, XmlValue>, text: &str) {
    if let Some(XmlValue::Text(value)) = ctx.frame_mut().value_mut() {
        value.push_str(text);
    }
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    }
}

fn character_reference(ctx: &mut ActionContext<'_, XmlValue>, digits: &str, radix: u32) {
    match u32::from_str_radix(digits, radix).ok().and_then(char::from_u32) {
        Some(ch) => ctx.set_value(XmlValue::Text(ch.to_string())),
        None => {
            let text = ctx.text().to_string();
            ctx.raise(format!("'{text}' is not a valid character reference"));
        }
    }
}

/// A quoted attribute value: `quote ([^<&quote] | Reference)* quote`.
fn quoted(quote: char) -> Parser<XmlValue> {
    let excluded = format!("<&{quote}");
    Parser::char(quote)
        .action("open")
        .then(
            Parser::inverse_set(&excluded)
                .plus()
                .action("chars")
                .or(Parser::nonterminal("Reference").action("reference"))
                .star(),
        )
        .then(Parser::char(quote).expect())
}

fn until(terminator: &str) -> Parser<XmlValue> {
    Parser::any_char().except(Parser::literal(terminator)).star()
}

/// A non-validating XML 1.0 subset: elements, attributes, character and
/// entity references, CDATA sections, comments and processing
/// instructions (including the XML declaration). There is no skip rule;
/// white space is character data.
///
/// Every rule that reports events inherits the `processor` attribute.
pub fn grammar() -> GrammarBuilder<XmlValue> {
    let name = Parser::letter()
        .or(Parser::set("_:"))
        .then(Parser::letter().or(Parser::digit()).or(Parser::set("._:-")).star())
        .token()
        .action("value");

    let document = Parser::empty()
        .action("start")
        .then(call("Misc").star())
        .then(call("Element").expect())
        .then(call("Misc").star())
        .action("end");

    let misc = call("Comment")
        .or(call("ProcessingInstruction"))
        .or(Parser::nonterminal("S"));

    let start_tag = Parser::char('<')
        .then(Parser::nonterminal("Name").action("begin"))
        .then(Parser::nonterminal("S").then(call("Attribute")).star())
        .then(Parser::nonterminal("S").opt());
    let end_tag = Parser::literal("</")
        .then(Parser::nonterminal("Name").expect().action("close"))
        .then(Parser::nonterminal("S").opt())
        .then(Parser::char('>').expect());
    let element = start_tag.then(
        Parser::literal("/>")
            .action("empty")
            .or(Parser::char('>')
                .action("open")
                .then(call("Content"))
                .then(end_tag.expect()))
            .expect(),
    );

    let attribute = Parser::nonterminal("Name")
        .then(Parser::nonterminal("S").opt())
        .then(Parser::char('=').expect())
        .then(Parser::nonterminal("S").opt())
        .then(Parser::nonterminal("AttributeValue").expect())
        .action("add");

    let content = call("CharData")
        .or(call("Element"))
        .or(Parser::nonterminal("Reference").action("reference"))
        .or(call("CDataSection"))
        .or(call("ProcessingInstruction"))
        .or(call("Comment"))
        .star();

    let reference = Parser::char('&')
        .then(
            Parser::literal("#x")
                .then(Parser::hex_digit().plus().action("hex"))
                .or(Parser::char('#').then(Parser::digit().plus().action("decimal")))
                .or(Parser::nonterminal("Name").action("entity"))
                .expect(),
        )
        .then(Parser::char(';').expect());

    let comment = Parser::literal("<!--")
        .then(until("--").action("text"))
        .then(Parser::literal("-->").expect());

    let cdata = Parser::literal("<![CDATA[")
        .then(until("]]>").action("text"))
        .then(Parser::literal("]]>").expect());

    let processing_instruction = Parser::literal("<?")
        .then(Parser::nonterminal("Name"))
        .then(Parser::nonterminal("S").then(until("?>").action("data")).opt())
        .then(Parser::literal("?>").expect())
        .action("emit");

    GrammarBuilder::new(NAME)
        .namespace("xml")
        .rule(
            RuleBuilder::new("Document", document)
                .info("document")
                .inherited("processor")
                .action("start", |ctx| emit(ctx, |p| p.start_document()))
                .action("end", |ctx| emit(ctx, |p| p.end_document())),
        )
        .rule(RuleBuilder::new("Misc", misc).inherited("processor"))
        .rule(
            RuleBuilder::new("Element", element)
                .info("element")
                .inherited("processor")
                .local("tag")
                .action("begin", |ctx| {
                    let Some(name) = take_text(ctx, "Name") else {
                        return ctx.reject();
                    };
                    ctx.frame_mut().set_local("tag", XmlValue::Text(name.clone()));
                    emit(ctx, |p| p.begin_start_tag(&name));
                })
                .action("empty", |ctx| {
                    let tag = ctx.frame_mut().take_local("tag").and_then(XmlValue::into_text);
                    emit(ctx, |p| {
                        p.end_start_tag();
                        p.end_tag(tag.as_deref().unwrap_or_default());
                    });
                })
                .action("open", |ctx| emit(ctx, |p| p.end_start_tag()))
                .action("close", |ctx| {
                    let found = take_text(ctx, "Name").unwrap_or_default();
                    let expected = ctx.frame_mut().take_local("tag").and_then(XmlValue::into_text);
                    match expected {
                        Some(expected) if expected == found => emit(ctx, |p| p.end_tag(&found)),
                        Some(expected) => ctx.raise(format!(
                            "end tag '{found}' does not match start tag '{expected}'"
                        )),
                        None => ctx.raise(format!("end tag '{found}' has no start tag")),
                    }
                }),
        )
        .rule(
            RuleBuilder::new("Attribute", attribute)
                .info("attribute")
                .inherited("processor")
                .action("add", |ctx| {
                    let (Some(name), Some(value)) =
                        (take_text(ctx, "Name"), take_text(ctx, "AttributeValue"))
                    else {
                        return ctx.reject();
                    };
                    emit(ctx, |p| p.add_attribute(&name, &value));
                }),
        )
        .rule(
            RuleBuilder::new("AttributeValue", quoted('"').or(quoted('\'')))
                .info("attribute value")
                .value("Text")
                .action("open", |ctx| ctx.set_value(XmlValue::Text(String::new())))
                .action("chars", |ctx| {
                    let text = ctx.text().to_string();
                    append_value(ctx, &text);
                })
                .action("reference", |ctx| {
                    if let Some(text) = take_text(ctx, "Reference") {
                        append_value(ctx, &text);
                    }
                }),
        )
        .rule(
            RuleBuilder::new("Content", content)
                .info("content")
                .inherited("processor")
                .action("reference", |ctx| {
                    if let Some(text) = take_text(ctx, "Reference") {
                        emit(ctx, |p| p.text(&text));
                    }
                }),
        )
        .rule(
            RuleBuilder::new("CharData", Parser::inverse_set("<&").plus().action("text"))
                .info("character data")
                .inherited("processor")
                .action("text", |ctx| {
                    let text = ctx.text().to_string();
                    emit(ctx, |p| p.text(&text));
                }),
        )
        .rule(
            RuleBuilder::new("Reference", reference)
                .info("reference")
                .value("Text")
                .action("hex", |ctx| {
                    let digits = ctx.text().to_string();
                    character_reference(ctx, &digits, 16);
                })
                .action("decimal", |ctx| {
                    let digits = ctx.text().to_string();
                    character_reference(ctx, &digits, 10);
                })
                .action("entity", |ctx| {
                    let name = take_text(ctx, "Name").unwrap_or_default();
                    match predefined_entity(&name) {
                        Some(ch) => ctx.set_value(XmlValue::Text(ch.to_string())),
                        None => ctx.raise(format!("undefined entity '&{name};'")),
                    }
                }),
        )
        .rule(
            RuleBuilder::new("CDataSection", cdata)
                .info("CDATA section")
                .inherited("processor")
                .action("text", |ctx| {
                    let text = ctx.text().to_string();
                    emit(ctx, |p| p.text(&text));
                }),
        )
        .rule(
            RuleBuilder::new("Comment", comment)
                .info("comment")
                .inherited("processor")
                .action("text", |ctx| {
                    let text = ctx.text().to_string();
                    emit(ctx, |p| p.comment(&text));
                }),
        )
        .rule(
            RuleBuilder::new("ProcessingInstruction", processing_instruction)
                .info("processing instruction")
                .inherited("processor")
                .local("data")
                .action("data", |ctx| {
                    let data = ctx.text().to_string();
                    ctx.frame_mut().set_local("data", XmlValue::Text(data));
                })
                .action("emit", |ctx| {
                    let target = take_text(ctx, "Name").unwrap_or_default();
                    let data = ctx
                        .frame_mut()
                        .take_local("data")
                        .and_then(XmlValue::into_text)
                        .unwrap_or_default();
                    emit(ctx, |p| p.processing_instruction(&target, &data));
                }),
        )
        .rule(
            RuleBuilder::new("Name", name)
                .info("name")
                .value("Text")
                .action("value", |ctx| {
                    let text = ctx.text().to_string();
                    ctx.set_value(XmlValue::Text(text));
                }),
        )
        .rule(RuleBuilder::new("S", Parser::set(" \t\r\n").plus()).info("white space"))
        .start("Document")
}
