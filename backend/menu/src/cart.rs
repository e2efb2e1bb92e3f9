//! # Cart
//!
//! Public page cart. One [`Cart`] value per browser session, owned by whoever
//! renders the page and passed by reference into rendering and checkout.
//!
//! ## Checkout
//! Orders are not stored anywhere. Checkout builds a plain-text message and hands
//! it to WhatsApp through a `https://wa.me/<phone>?text=<message>` deep link.
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
    error::MenuError,
    item::{Item, ItemId},
};

const WHATSAPP_ENDPOINT: &str = "https://wa.me";

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub qty: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.price * self.qty as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn add(&mut self, item: &Item) {
        match self.lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.qty += 1,
            None => self.lines.push(CartLine {
                id: item.id,
                name: item.name.clone(),
                price: item.price,
                qty: 1,
            }),
        }
    }

    /// Unknown ids are ignored. A line that drops to zero is removed.
    pub fn change_qty(&mut self, id: ItemId, delta: i32) {
        let Some(index) = self.lines.iter().position(|line| line.id == id) else {
            return;
        };

        let qty = self.lines[index].qty as i64 + delta as i64;
        if qty <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].qty = qty as u32;
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn checkout_message(&self, template: &CheckoutTemplate) -> Result<String, MenuError> {
        if self.is_empty() {
            return Err(MenuError::EmptyCart);
        }

        let mut message = format!("{}\n\n", template.heading);
        for line in &self.lines {
            message.push_str(&format!("{} × {}\n", line.name, line.qty));
        }
        message.push_str(&format!(
            "\n{}: {:.0} {}",
            template.total_label,
            self.total(),
            template.currency
        ));

        Ok(message)
    }

    pub fn whatsapp_url(
        &self,
        phone: &str,
        template: &CheckoutTemplate,
    ) -> Result<String, MenuError> {
        let message = self.checkout_message(template)?;
        let phone: String = phone.chars().filter(char::is_ascii_digit).collect();

        Ok(format!(
            "{WHATSAPP_ENDPOINT}/{phone}?text={}",
            utf8_percent_encode(&message, NON_ALPHANUMERIC)
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutTemplate {
    pub heading: String,
    pub total_label: String,
    pub currency: String,
}

impl Default for CheckoutTemplate {
    fn default() -> Self {
        Self {
            heading: "طلب من مطعم المنقل:".to_string(),
            total_label: "الإجمالي".to_string(),
            currency: "L.L.".to_string(),
        }
    }
}
