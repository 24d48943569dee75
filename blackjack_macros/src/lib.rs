use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{self, Ident};

/// This macro is added before a method of `Simulator` struct in the impl block.
/// Use this macro to first check if current round phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(PlaceBet)]` will make a method first check
/// if current round phase is `PlaceBet`. If not, the method will return
/// `Error::WrongPhase` naming the method, the expected and the actual phase.
///
/// The annotated method must return `Result<_, crate::Error>`, and both
/// `RoundPhase` and a `current_round_phase` field must be in scope.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };
    let phase: Ident = match syn::parse(attr) {
        Ok(phase) => phase,
        Err(err) => return err.to_compile_error().into(),
    };

    let operation = ast.sig.ident.to_string();
    let guard = phase_guard(&operation, &phase);
    let early_return: syn::Stmt = match syn::parse2(guard) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}

fn phase_guard(operation: &str, phase: &Ident) -> TokenStream2 {
    quote! {
        if self.current_round_phase != RoundPhase::#phase {
            return Err(crate::Error::WrongPhase {
                operation: #operation,
                expected: RoundPhase::#phase,
                actual: self.current_round_phase,
            });
        }
    }
}
