use anyhow::{bail, Context, Result};
use colored::*;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚚 Control de Flota - Smoke Test".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = prompt("URL del servidor [http://localhost:3000]: ")?;
    let base_url = if base_url.is_empty() {
        "http://localhost:3000".to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };
    let client = Client::new();

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🔍 Listar registros de entrada/salida");
        println!("2. 🔄 Ciclo completo (crear, actualizar, eliminar)");
        println!("3. 🔧 Herramientas pendientes");
        println!("4. 🚪 Salir");

        match prompt("Selecciona una opción (1-4): ")?.as_str() {
            "1" => {
                let (status, body) = call(&client, Method::GET, &format!("{}/api/entrada-salida", base_url), None).await?;
                show("GET /api/entrada-salida", status, &body)?;
            }
            "2" => {
                if let Err(e) = full_cycle(&client, &base_url).await {
                    println!("{}", format!("❌ Ciclo fallido: {:#}", e).bright_red());
                } else {
                    println!("{}", "✅ Ciclo completo sin errores".bright_green().bold());
                }
            }
            "3" => {
                let (status, body) = call(&client, Method::GET, &format!("{}/api/herramientas/pendientes", base_url), None).await?;
                show("GET /api/herramientas/pendientes", status, &body)?;
            }
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
            }
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn call(client: &Client, method: Method, url: &str, body: Option<&Value>) -> Result<(StatusCode, Value)> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await.with_context(|| format!("No se pudo conectar a {}", url))?;
    let status = response.status();
    let text = response.text().await?;
    let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Ok((status, value))
}

fn show(label: &str, status: StatusCode, body: &Value) -> Result<()> {
    let status_text = format!("{}", status);
    let status_text = if status.is_success() { status_text.bright_green() } else { status_text.bright_red() };
    println!("{} {}", format!("📥 {}:", label).bright_blue(), status_text);
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

fn expect_status(label: &str, status: StatusCode, expected: StatusCode, body: &Value) -> Result<()> {
    show(label, status, body)?;
    if status != expected {
        bail!("{}: se esperaba {} y llegó {}", label, expected, status);
    }
    Ok(())
}

/// Crea un registro, lo reemplaza, lo elimina y verifica que ya no aparezca
async fn full_cycle(client: &Client, base_url: &str) -> Result<()> {
    println!();
    println!("{}", "🔄 CICLO ENTRADA/SALIDA".bright_cyan().bold());
    println!("{}", "========================".bright_cyan());

    let coleccion = format!("{}/api/entrada-salida", base_url);
    let nuevo = json!({
        "tipo": "entrada",
        "placa": "SMK-0001",
        "nombreConductor": "Prueba Smoke",
        "celular": "5500000000",
        "observaciones": "Registro de prueba",
        "fotos": []
    });

    let (status, creado) = call(client, Method::POST, &coleccion, Some(&nuevo)).await?;
    expect_status("POST", status, StatusCode::CREATED, &creado)?;
    let id = creado["id"].as_str().context("La respuesta no trae id")?.to_string();
    let recurso = format!("{}/{}", coleccion, id);

    let mut cambio = nuevo.clone();
    cambio["tipo"] = json!("salida");
    let (status, actualizado) = call(client, Method::PUT, &recurso, Some(&cambio)).await?;
    expect_status("PUT", status, StatusCode::OK, &actualizado)?;

    let mut invalido = nuevo.clone();
    invalido["celular"] = json!("123");
    let (status, error) = call(client, Method::POST, &coleccion, Some(&invalido)).await?;
    expect_status("POST celular inválido", status, StatusCode::BAD_REQUEST, &error)?;

    let (status, borrado) = call(client, Method::DELETE, &recurso, None).await?;
    expect_status("DELETE", status, StatusCode::OK, &borrado)?;

    let (_, lista) = call(client, Method::GET, &coleccion, None).await?;
    let sigue = lista
        .as_array()
        .map(|registros| registros.iter().any(|r| r["id"] == json!(id)))
        .unwrap_or(false);
    if sigue {
        bail!("El registro {} sigue apareciendo después de eliminarlo", id);
    }

    Ok(())
}
