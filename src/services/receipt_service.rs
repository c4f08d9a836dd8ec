// src/services/receipt_service.rs
//
// Comprovante em PDF de uma venda completada: rifa, comprador, números
// e a chave PIX da plataforma como QR Code.

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RaffleRepository, SaleRepository},
    models::sale::SaleStatus,
};

#[derive(Clone)]
pub struct ReceiptConfig {
    pub platform_name: String,
    pub pix_key: Option<String>,
}

#[derive(Clone)]
pub struct ReceiptService {
    sale_repo: SaleRepository,
    raffle_repo: RaffleRepository,
    config: ReceiptConfig,
    pool: PgPool,
}

impl ReceiptService {
    pub fn new(
        sale_repo: SaleRepository,
        raffle_repo: RaffleRepository,
        config: ReceiptConfig,
        pool: PgPool,
    ) -> Self {
        Self {
            sale_repo,
            raffle_repo,
            config,
            pool,
        }
    }

    pub async fn generate_sale_receipt(&self, sale_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os Dados
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;

        // Comprovante só existe para venda paga/acertada.
        if sale.status != SaleStatus::Completed {
            return Err(AppError::InvalidTransition {
                from: sale.status.as_str().to_string(),
                to: "COMPROVANTE".to_string(),
            });
        }

        let raffle = self
            .raffle_repo
            .find_by_id(&mut *tx, sale.raffle_id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        let numbers = self.raffle_repo.numbers_for_sale(&mut *tx, sale.id).await?;

        tx.commit().await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Comprovante — {}", raffle.title));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(self.config.platform_name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("COMPROVANTE — {}", raffle.title))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            sale.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Comprador: {} — {}",
            sale.customer_name, sale.customer_city
        )));

        if let Some(draw_date) = raffle.draw_date {
            doc.push(elements::Paragraph::new(format!(
                "Sorteio: {}",
                draw_date.format("%d/%m/%Y")
            )));
        }

        doc.push(elements::Break::new(2));

        // --- RESUMO DA COMPRA ---
        let mut table = elements::TableLayout::new(vec![2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Quantidade").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        table
            .row()
            .element(elements::Paragraph::new(format!("{}", sale.quantity)))
            .element(elements::Paragraph::new(format!("R$ {:.2}", sale.unit_price)))
            .element(elements::Paragraph::new(format!("R$ {:.2}", sale.total_amount)))
            .push()
            .expect("Table row error");

        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- NÚMEROS DA SORTE ---
        doc.push(
            elements::Paragraph::new("SEUS NÚMEROS")
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        let formatted: Vec<String> = numbers.iter().map(|n| format!("{:04}", n)).collect();
        doc.push(elements::Paragraph::new(formatted.join("  ")));

        doc.push(elements::Break::new(2));

        // --- ÁREA DE PAGAMENTO (QR CODE) ---
        if let Some(key) = &self.config.pix_key {
            doc.push(
                elements::Paragraph::new("PIX DA PLATAFORMA")
                    .styled(style::Style::new().bold().with_font_size(12)),
            );
            doc.push(elements::Paragraph::new(format!("Chave: {}", key)));
            doc.push(elements::Break::new(1));

            let code = QrCode::new(key.as_bytes())
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

            // Renderiza para imagem
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(pdf_image);
        }

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
