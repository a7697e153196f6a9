//! Order Validation
//!
//! This example walks through the rule tree and the command pipeline.
//!
//! Key concepts:
//! - AND successors that only run when their parent passed
//! - OR alternatives that let a failed rule recover
//! - Continuations that fetch more rules once everything else passed
//! - Service exceptions turned into failed results
//! - Running several commands at once
//!
//! Run with: cargo run --example order_validation

use rulebook::{
    execute_all, Command, CommandHooks, Context, Invocation, PipelineError, Rule, RuleError,
    RuleSet, ServiceException,
};

struct Order {
    id: u64,
    quantity: u32,
    in_stock: u32,
    has_card: bool,
    invoice_allowed: bool,
}

impl CommandHooks for Order {
    type Output = u32;

    fn on_initialization<'a>(&'a self, context: &'a mut Context) -> Invocation<'a, ()> {
        Invocation::ready(context.insert("order_id", self.id))
    }

    fn get_rules<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, RuleSet> {
        let quantity = self.quantity;
        let has_card = self.has_card;
        let invoice_allowed = self.invoice_allowed;

        let rules = vec![
            Rule::predicate("quantity must be positive", move || quantity > 0)
                .with_association("quantity")
                .if_valid_then_validate(
                    Rule::predicate("at most 10 per order", move || quantity <= 10)
                        .with_association("quantity"),
                ),
            Rule::predicate("no card on file", move || has_card)
                .with_association("payment")
                .if_invalid_then_validate(
                    Rule::predicate("invoicing not allowed", move || invoice_allowed)
                        .with_association("payment"),
                ),
        ];
        Invocation::ready(Ok(rules.into()))
    }

    fn on_validation_success<'a>(&'a self, _context: &'a mut Context) -> Invocation<'a, u32> {
        if self.quantity > self.in_stock {
            let exception = ServiceException::new("insufficient stock").with_error(
                RuleError::for_association("item", format!("only {} left", self.in_stock)),
            );
            return Invocation::failed(exception);
        }
        Invocation::ready(Ok(self.in_stock - self.quantity))
    }
}

fn order(id: u64, quantity: u32, has_card: bool, invoice_allowed: bool) -> Command<Order> {
    Command::new(Order {
        id,
        quantity,
        in_stock: 5,
        has_card,
        invoice_allowed,
    })
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Order Validation Example ===\n");

    // Example 1: A single rule tree
    println!("Example 1: Rule Tree");
    let mut rule = Rule::predicate("customer is active", || true)
        .with_association("customer")
        .if_valid_then_validate(Rule::predicate("credit limit reached", || false))
        .if_valid_then_get_rules(|| Invocation::ready(Ok(RuleSet::default())));
    rule.validate().await?;
    println!("  Valid: {}", rule.is_valid());
    for error in rule.errors() {
        println!("    - {}", error);
    }
    println!("  The continuation was skipped because a successor failed\n");

    // Example 2: A valid order
    println!("Example 2: Valid Order");
    let result = order(1, 2, true, false).execute().await?;
    println!("  Success: {}", result.is_success());
    println!("  Remaining stock: {:?}\n", result.value());

    // Example 3: Every failed rule is reported
    println!("Example 3: Invalid Order");
    let result = order(2, 12, false, false).execute().await?;
    println!("  Success: {}", result.is_success());
    for error in result.errors().unwrap_or_default() {
        println!("    - {}", error);
    }
    println!();

    // Example 4: Pre-flight validation without business logic
    println!("Example 4: Pre-flight Check");
    let errors = order(3, 1, false, true).get_errors().await?;
    println!("  Errors before placing order 3: {}", errors.len());
    println!("  Invoicing recovered the missing card\n");

    // Example 5: Service exceptions become failed results
    println!("Example 5: Service Exception");
    let result = order(4, 5, true, false).execute().await?;
    println!("  Success: {}", result.is_success());
    let result = order(5, 6, true, false).execute().await?;
    println!("  Success: {}", result.is_success());
    for error in result.errors().unwrap_or_default() {
        println!("    - {}", error);
    }
    println!();

    // Example 6: Several commands at once
    println!("Example 6: Batch Execution");
    let commands = vec![order(6, 1, true, false), order(7, 0, true, false)];
    match execute_all(&commands).await {
        Ok(results) => {
            for (index, result) in results.iter().enumerate() {
                println!("  Command {}: success = {}", index, result.is_success());
            }
        }
        Err(error) => println!("  Batch aborted: {}", error),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
