// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompts sent to the upstream completion API.
//!
//! The base prompt teaches the assistant to recognize situations that need
//! a human agent; category prompts narrow its knowledge to the topic the
//! customer picked.

use atelier_core::types::Category;

const BASE_PROMPT: &str = "\
You are the virtual assistant of an e-commerce clothing store called \"Fashion Store\".

IMPORTANT: Be helpful, but also recognize when the customer needs a human agent.

Situations that REQUIRE a transfer to a human agent:
- Serious complaints or evident dissatisfaction
- Payment or refund problems
- Orders not received or significantly delayed
- Defective products
- Cancellation or reimbursement requests
- Any situation where the customer shows frustration

When you identify one of these situations, say you will transfer the customer and ask: \
\"Would you like me to transfer you to a human agent now?\"
";

fn category_prompt(category: Category) -> &'static str {
    match category {
        Category::Products => {
            "Category: PRODUCTS AND APPAREL

You can help with:
- Size information (we carry S through XXL)
- Available colors and styles
- Fabrics and materials
- Outfit suggestions and combinations
- Measurement charts
- Stock availability

Example products: T-shirts, Pants, Dresses, Jackets, Accessories."
        }
        Category::Orders => {
            "Category: MY ORDERS

You can help with:
- Order status
- Tracking codes
- Delivery estimates (standard: 5-7 business days)
- Purchase history lookups

For questions about delays or delivery problems, offer to transfer to an agent."
        }
        Category::Complaints => {
            "Category: COMPLAINTS

ATTENTION: This is a sensitive category. Be very empathetic and ALWAYS offer a \
transfer to a human agent.

Show understanding:
- \"I'm very sorry for the inconvenience...\"
- \"I understand your frustration...\"
- \"Let's solve this together...\"

After hearing the problem, ALWAYS ask: \"Would you like me to transfer you to a \
human agent who can resolve this right away?\""
        }
        Category::Questions => {
            "Category: GENERAL QUESTIONS

You can help with:
- Exchange policy (30 days)
- Return policy
- Payment methods (Card, Bank slip, Instant transfer)
- Shipping (free above $199)
- Coupons and promotions
- Signup and login

For exchanges or returns of specific orders, offer to transfer to an agent."
        }
    }
}

/// The full system prompt for a conversation: base rules plus the picked
/// category's briefing, when one is set.
pub fn system_prompt(category: Option<Category>) -> String {
    match category {
        Some(cat) => format!("{BASE_PROMPT}\n{}", category_prompt(cat)),
        None => BASE_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_category_is_the_base() {
        let prompt = system_prompt(None);
        assert!(prompt.contains("Fashion Store"));
        assert!(!prompt.contains("Category:"));
    }

    #[test]
    fn prompt_includes_picked_category_briefing() {
        let prompt = system_prompt(Some(Category::Complaints));
        assert!(prompt.contains("Fashion Store"));
        assert!(prompt.contains("Category: COMPLAINTS"));

        let prompt = system_prompt(Some(Category::Products));
        assert!(prompt.contains("Category: PRODUCTS AND APPAREL"));
    }
}
